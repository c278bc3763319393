// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 Ryo ∴ SpiralArchitect (kishkavsesvit@icloud.com)
// Part of torch2grid — Licensed under AGPL-3.0-or-later.

//! Loading transformer plugins from shared libraries.
//!
//! A plugin library is a `cdylib` crate built against this exact version of
//! `t2g-core` that invokes [`export_plugins!`](crate::export_plugins). The
//! macro exports a [`PluginDeclaration`] whose registration hook hands one
//! zero-argument factory per plugin type to a [`PluginRegistrar`].
//!
//! # Trust
//!
//! Loaded code runs inside this process with its full privileges. There is no
//! sandbox; only load libraries you would link against directly.

use super::registry::PluginRegistry;
use super::traits::{PluginHandle, TransformerPlugin};
use crate::error::{GridError, GridResult};
use crate::grid::Grid;
use crate::tensor::TensorCollection;
use libloading::Library;
use std::borrow::Cow;
use std::env::consts::DLL_EXTENSION;
use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// Version of `t2g-core` a plugin library must have been built against.
pub const CORE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Exported symbol holding a library's [`PluginDeclaration`].
pub const DECLARATION_SYMBOL: &str = "t2g_plugin_declaration";

/// Files starting with this prefix are skipped by directory scans.
pub const PRIVATE_PREFIX: char = '_';

/// Zero-argument plugin constructor. Failures are reported as text.
pub type PluginFactory = fn() -> Result<Box<dyn TransformerPlugin>, String>;

/// Receives the plugin factories a library declares.
pub trait PluginRegistrar {
    fn register_factory(&mut self, label: &str, factory: PluginFactory);
}

/// Entry point exported by every plugin library.
#[derive(Clone, Copy)]
pub struct PluginDeclaration {
    pub core_version: &'static str,
    pub register: fn(&mut dyn PluginRegistrar),
}

/// Factory for plugin types constructible through `Default`.
pub fn default_factory<P>() -> Result<Box<dyn TransformerPlugin>, String>
where
    P: TransformerPlugin + Default + 'static,
{
    Ok(Box::new(P::default()))
}

/// Exports a [`PluginDeclaration`] registering each listed plugin type.
///
/// Every type must implement `TransformerPlugin + Default`. Use at most once
/// per library crate.
///
/// ```rust,ignore
/// #[derive(Default)]
/// pub struct ReversedTransformer;
/// // impl TransformerPlugin for ReversedTransformer { ... }
///
/// t2g_core::export_plugins!(ReversedTransformer);
/// ```
#[macro_export]
macro_rules! export_plugins {
    ($($plugin:ty),+ $(,)?) => {
        #[doc(hidden)]
        #[no_mangle]
        #[allow(non_upper_case_globals)]
        pub static t2g_plugin_declaration: $crate::plugin::PluginDeclaration =
            $crate::plugin::PluginDeclaration {
                core_version: $crate::plugin::CORE_VERSION,
                register: {
                    fn register(registrar: &mut dyn $crate::plugin::PluginRegistrar) {
                        $(
                            registrar.register_factory(
                                stringify!($plugin),
                                $crate::plugin::default_factory::<$plugin>,
                            );
                        )+
                    }
                    register
                },
            };
    };
}

#[derive(Default)]
struct FactoryCollector {
    candidates: Vec<(String, PluginFactory)>,
}

impl PluginRegistrar for FactoryCollector {
    fn register_factory(&mut self, label: &str, factory: PluginFactory) {
        self.candidates.push((label.to_string(), factory));
    }
}

/// Plugin created by a dynamically loaded library.
///
/// Holds the library so its code stays mapped for as long as any handle to
/// the plugin exists. `plugin` must be declared first: fields drop in order.
struct LibraryPlugin {
    plugin: Box<dyn TransformerPlugin>,
    _library: Arc<Library>,
}

impl TransformerPlugin for LibraryPlugin {
    fn name(&self) -> &str {
        self.plugin.name()
    }

    fn description(&self) -> &str {
        self.plugin.description()
    }

    fn can_handle(&self, tensors: &TensorCollection) -> bool {
        self.plugin.can_handle(tensors)
    }

    fn preprocess<'a>(&self, tensors: Cow<'a, TensorCollection>) -> Cow<'a, TensorCollection> {
        self.plugin.preprocess(tensors)
    }

    fn transform(&self, tensors: &TensorCollection) -> Grid {
        self.plugin.transform(tensors)
    }

    fn postprocess(&self, grid: Grid) -> Grid {
        self.plugin.postprocess(grid)
    }
}

impl PluginRegistry {
    /// Load a shared library and register every plugin it declares.
    ///
    /// Returns the number of plugins registered. Candidates that fail to
    /// construct or violate the plugin contract are logged and skipped; a
    /// library declaring no usable plugin only produces a warning.
    pub fn load_from_file(&self, path: impl AsRef<Path>) -> GridResult<usize> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(GridError::PluginFileNotFound(path.to_path_buf()));
        }

        // SAFETY: opening the library runs its initialisers. Plugin libraries
        // are trusted code, see the module documentation.
        let library = unsafe { Library::new(path) }.map_err(|source| GridError::Load {
            path: path.to_path_buf(),
            source,
        })?;

        // SAFETY: `export_plugins!` exports the symbol as a `PluginDeclaration`
        // static, and the version check below rejects libraries built against
        // a different layout. The copy does not outlive `library`.
        let declaration = unsafe {
            library
                .get::<*const PluginDeclaration>(DECLARATION_SYMBOL.as_bytes())
                .map(|symbol| **symbol)
                .map_err(|_| GridError::MissingDeclaration(path.to_path_buf()))?
        };

        let origin = path.display().to_string();
        ensure_compatible(&declaration, &origin)?;
        Ok(self.install(&declaration, Some(Arc::new(library)), &origin))
    }

    /// Register every plugin of a statically linked declaration, through the
    /// same path used for shared libraries.
    pub fn load_declaration(&self, declaration: &PluginDeclaration) -> GridResult<usize> {
        let origin = "static declaration";
        ensure_compatible(declaration, origin)?;
        Ok(self.install(declaration, None, origin))
    }

    /// Load every plugin library directly inside `dir`.
    ///
    /// Only files with the platform's shared library extension are considered
    /// and names starting with `_` are skipped. Files are visited in name
    /// order; a file that fails to load is logged and the scan continues.
    pub fn load_from_directory(&self, dir: impl AsRef<Path>) -> GridResult<usize> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(GridError::NotADirectory(dir.to_path_buf()));
        }

        let mut libraries: Vec<PathBuf> = fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|entry| entry.path()))
            .filter(|path| is_plugin_library(path))
            .collect();
        libraries.sort();

        let mut total = 0;
        for path in libraries {
            match self.load_from_file(&path) {
                Ok(count) => total += count,
                Err(err) => warn!(path = %path.display(), "skipping plugin library: {err}"),
            }
        }
        Ok(total)
    }

    fn install(
        &self,
        declaration: &PluginDeclaration,
        library: Option<Arc<Library>>,
        origin: &str,
    ) -> usize {
        let mut collector = FactoryCollector::default();
        (declaration.register)(&mut collector);

        let mut registered = 0;
        for (label, factory) in collector.candidates {
            let plugin = match panic::catch_unwind(AssertUnwindSafe(factory)) {
                Ok(Ok(plugin)) => plugin,
                Ok(Err(reason)) => {
                    warn!(
                        origin = %origin,
                        candidate = %label,
                        "could not instantiate plugin: {reason}"
                    );
                    continue;
                }
                Err(_) => {
                    warn!(origin = %origin, candidate = %label, "plugin constructor panicked");
                    continue;
                }
            };

            let handle: PluginHandle = match &library {
                Some(library) => Arc::new(LibraryPlugin {
                    plugin,
                    _library: Arc::clone(library),
                }),
                None => Arc::from(plugin),
            };
            match self.register_handle(handle) {
                Ok(()) => {
                    debug!(origin = %origin, candidate = %label, "plugin candidate registered");
                    registered += 1;
                }
                Err(err) => {
                    warn!(origin = %origin, candidate = %label, "rejected plugin: {err}")
                }
            }
        }

        if registered == 0 {
            warn!(origin = %origin, "no plugins found");
        }
        registered
    }
}

fn ensure_compatible(declaration: &PluginDeclaration, origin: &str) -> GridResult<()> {
    if declaration.core_version == CORE_VERSION {
        return Ok(());
    }
    Err(GridError::VersionMismatch {
        origin: origin.to_string(),
        expected: CORE_VERSION.to_string(),
        found: declaration.core_version.to_string(),
    })
}

fn is_plugin_library(path: &Path) -> bool {
    let private = path
        .file_name()
        .and_then(|name| name.to_str())
        .map_or(true, |name| name.starts_with(PRIVATE_PREFIX));
    !private && path.is_file() && path.extension().is_some_and(|ext| ext == DLL_EXTENSION)
}
