//! # Beam Library
//!
//! Persistent catalog of materials, beam blanks, and named loads, stored as
//! human-readable JSON. The library is seeded with a default catalog on first
//! use and edited in place by the CLI.
//!
//! Safety features carried over from shared-drive use:
//! - **Atomic saves**: write to .tmp, fsync, rename
//! - **File locking**: OS-level lock plus a `.lock` metadata file
//! - **Version validation**: schema compatibility check on load
//!
//! ## Sign convention at the library boundary
//!
//! Library magnitudes are entered the way engineers write them: positive
//! values act downward. [`LoadEntry::to_load`] negates into the solver's
//! signed deflection axis, so a positive library load produces negative
//! (downward) deflection.
//!
//! ## Example
//!
//! ```rust,no_run
//! use beam_core::library::BeamLibrary;
//! use std::path::Path;
//!
//! let library = BeamLibrary::load_or_default(Path::new("library_data.json")).unwrap();
//! for beam in &library.beams {
//!     println!("{}: {} m, I = {:.3e} m^4", beam.name, beam.length, beam.moment_of_inertia());
//! }
//! ```

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use fs2::FileExt;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{BeamError, BeamResult};
use crate::loads::Load;

/// Current schema version for library files
pub const SCHEMA_VERSION: &str = "0.1.0";

/// Default material catalog, used to seed a fresh library
pub static DEFAULT_MATERIALS: Lazy<Vec<Material>> = Lazy::new(|| {
    vec![
        Material::new("Steel", 200e9),
        Material::new("Aluminum", 69e9),
        Material::new("Titanium", 116e9),
    ]
});

/// A beam material
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    /// Display name, unique within a library (case-insensitive)
    pub name: String,
    /// Young's modulus E (Pa)
    pub elastic_modulus: f64,
}

impl Material {
    /// Create a material
    pub fn new(name: impl Into<String>, elastic_modulus: f64) -> Self {
        Material {
            name: name.into(),
            elastic_modulus,
        }
    }
}

/// A beam blank: length plus rectangular cross-section dimensions.
///
/// All dimensions in meters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeamSpec {
    /// Display name, unique within a library (case-insensitive)
    pub name: String,
    /// Beam length (m)
    pub length: f64,
    /// Section width (m)
    pub width: f64,
    /// Section thickness (m)
    pub thickness: f64,
}

impl BeamSpec {
    /// Create a beam blank
    pub fn new(name: impl Into<String>, length: f64, width: f64, thickness: f64) -> Self {
        BeamSpec {
            name: name.into(),
            length,
            width,
            thickness,
        }
    }

    /// Second moment of area for the rectangular section: w·t³/12 (m⁴)
    pub fn moment_of_inertia(&self) -> f64 {
        self.width * self.thickness.powi(3) / 12.0
    }
}

/// How a library load applies to a beam
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum LoadDefinition {
    /// Uniform load over the full beam span, w in N/m (positive downward)
    Distributed { w: f64 },
    /// Point force in N (positive downward) at a fixed position in m
    Point { magnitude: f64, position: f64 },
}

/// A named load stored in the library
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadEntry {
    /// Stable identifier for row management
    pub id: Uuid,
    /// Display name, unique within a library (case-insensitive)
    pub name: String,
    /// The load itself
    pub definition: LoadDefinition,
}

impl LoadEntry {
    /// Create a full-span distributed load entry (w positive downward, N/m)
    pub fn distributed(name: impl Into<String>, w: f64) -> Self {
        LoadEntry {
            id: Uuid::new_v4(),
            name: name.into(),
            definition: LoadDefinition::Distributed { w },
        }
    }

    /// Create a point load entry (magnitude positive downward, N)
    pub fn point(name: impl Into<String>, magnitude: f64, position: f64) -> Self {
        LoadEntry {
            id: Uuid::new_v4(),
            name: name.into(),
            definition: LoadDefinition::Point {
                magnitude,
                position,
            },
        }
    }

    /// Resolve this entry against a beam of the given length, flipping the
    /// positive-downward library sign onto the solver's deflection axis.
    ///
    /// Returns `None` when a point load falls beyond the beam; callers are
    /// expected to skip the combination rather than treat it as an error.
    pub fn to_load(&self, beam_length: f64) -> Option<Load> {
        match self.definition {
            LoadDefinition::Distributed { w } => {
                Some(Load::distributed(0.0, beam_length, -w))
            }
            LoadDefinition::Point {
                magnitude,
                position,
            } => {
                if position > beam_length {
                    None
                } else {
                    Some(Load::point(position, -magnitude))
                }
            }
        }
    }
}

/// Library file header
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibraryMetadata {
    /// Schema version (for migration compatibility)
    pub version: String,
    /// When the library was created
    pub created: DateTime<Utc>,
    /// When the library was last modified
    pub modified: DateTime<Utc>,
}

/// Root library container, serialized to the library JSON file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BeamLibrary {
    /// File metadata
    pub meta: LibraryMetadata,
    /// Available materials
    pub materials: Vec<Material>,
    /// Available beam blanks
    pub beams: Vec<BeamSpec>,
    /// Named loads
    pub loads: Vec<LoadEntry>,
}

impl BeamLibrary {
    /// Create an empty library
    pub fn new() -> Self {
        let now = Utc::now();
        BeamLibrary {
            meta: LibraryMetadata {
                version: SCHEMA_VERSION.to_string(),
                created: now,
                modified: now,
            },
            materials: Vec::new(),
            beams: Vec::new(),
            loads: Vec::new(),
        }
    }

    /// Create a library seeded with the default catalog:
    /// three materials, two beam blanks, three loads.
    pub fn with_defaults() -> Self {
        let mut library = BeamLibrary::new();
        library.materials = DEFAULT_MATERIALS.clone();
        library.beams = vec![
            BeamSpec::new("Beam1", 10.0, 0.3, 0.005),
            BeamSpec::new("Beam2", 8.0, 0.25, 0.004),
        ];
        library.loads = vec![
            LoadEntry::distributed("Uniform Load", 1000.0),
            LoadEntry::distributed("Heavy Uniform Load", 2000.0),
            LoadEntry::point("Point Load 1", 5000.0, 5.0),
        ];
        library
    }

    /// Update the modified timestamp
    pub fn touch(&mut self) {
        self.meta.modified = Utc::now();
    }

    /// Find a material by name (case-insensitive)
    pub fn find_material(&self, name: &str) -> Option<&Material> {
        self.materials
            .iter()
            .find(|m| m.name.eq_ignore_ascii_case(name))
    }

    /// Find a beam blank by name (case-insensitive)
    pub fn find_beam(&self, name: &str) -> Option<&BeamSpec> {
        self.beams
            .iter()
            .find(|b| b.name.eq_ignore_ascii_case(name))
    }

    /// Find a load entry by name (case-insensitive)
    pub fn find_load(&self, name: &str) -> Option<&LoadEntry> {
        self.loads
            .iter()
            .find(|l| l.name.eq_ignore_ascii_case(name))
    }

    /// Add a material; rejects duplicate names
    pub fn add_material(&mut self, material: Material) -> BeamResult<()> {
        if self.find_material(&material.name).is_some() {
            return Err(BeamError::duplicate_name("material", &material.name));
        }
        self.materials.push(material);
        self.touch();
        Ok(())
    }

    /// Add a beam blank; rejects duplicate names
    pub fn add_beam(&mut self, beam: BeamSpec) -> BeamResult<()> {
        if self.find_beam(&beam.name).is_some() {
            return Err(BeamError::duplicate_name("beam", &beam.name));
        }
        self.beams.push(beam);
        self.touch();
        Ok(())
    }

    /// Add a load entry; rejects duplicate names
    pub fn add_load(&mut self, load: LoadEntry) -> BeamResult<()> {
        if self.find_load(&load.name).is_some() {
            return Err(BeamError::duplicate_name("load", &load.name));
        }
        self.loads.push(load);
        self.touch();
        Ok(())
    }

    /// Remove a material by name; returns it if present
    pub fn remove_material(&mut self, name: &str) -> Option<Material> {
        let pos = self
            .materials
            .iter()
            .position(|m| m.name.eq_ignore_ascii_case(name))?;
        self.touch();
        Some(self.materials.remove(pos))
    }

    /// Remove a beam blank by name; returns it if present
    pub fn remove_beam(&mut self, name: &str) -> Option<BeamSpec> {
        let pos = self
            .beams
            .iter()
            .position(|b| b.name.eq_ignore_ascii_case(name))?;
        self.touch();
        Some(self.beams.remove(pos))
    }

    /// Remove a load entry by name; returns it if present
    pub fn remove_load(&mut self, name: &str) -> Option<LoadEntry> {
        let pos = self
            .loads
            .iter()
            .position(|l| l.name.eq_ignore_ascii_case(name))?;
        self.touch();
        Some(self.loads.remove(pos))
    }

    /// Load a library, seeding and saving the default catalog when the file
    /// does not exist yet.
    ///
    /// Seeding takes the file lock, so two processes racing on a fresh
    /// library file cannot both write it.
    ///
    /// # Errors
    ///
    /// Returns [`BeamError::FileLocked`] when another live process holds the
    /// lock on the missing file's path.
    pub fn load_or_default(path: &Path) -> BeamResult<Self> {
        if path.exists() {
            load_library(path)
        } else {
            let _lock = FileLock::acquire(path, current_user())?;
            let library = BeamLibrary::with_defaults();
            save_library(&library, path)?;
            Ok(library)
        }
    }
}

impl Default for BeamLibrary {
    fn default() -> Self {
        BeamLibrary::new()
    }
}

/// Lock file metadata stored next to the library file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockInfo {
    /// User identifier (email or username)
    pub user_id: String,
    /// Machine name where the lock was acquired
    pub machine: String,
    /// Process ID that holds the lock
    pub pid: u32,
    /// When the lock was acquired
    pub locked_at: DateTime<Utc>,
}

impl LockInfo {
    fn new(user_id: impl Into<String>) -> Self {
        LockInfo {
            user_id: user_id.into(),
            machine: hostname().unwrap_or_else(|| "unknown".to_string()),
            pid: std::process::id(),
            locked_at: Utc::now(),
        }
    }
}

/// Best-effort identity for lock metadata
fn current_user() -> String {
    #[cfg(windows)]
    let var = std::env::var("USERNAME");
    #[cfg(not(windows))]
    let var = std::env::var("USER");
    var.unwrap_or_else(|_| "unknown".to_string())
}

fn hostname() -> Option<String> {
    #[cfg(windows)]
    {
        std::env::var("COMPUTERNAME").ok()
    }
    #[cfg(not(windows))]
    {
        std::env::var("HOSTNAME")
            .ok()
            .or_else(|| std::env::var("HOST").ok())
    }
}

/// Exclusive lock on a library file, released on drop.
///
/// Pairs an OS-level lock (fs2) with a `.lock` metadata file so other users
/// can see who holds it.
pub struct FileLock {
    lock_path: PathBuf,
    _lock_file: File,
    /// Lock metadata
    pub info: LockInfo,
}

impl FileLock {
    /// Acquire an exclusive lock on a library file.
    ///
    /// # Errors
    ///
    /// Returns [`BeamError::FileLocked`] when another live process holds the
    /// lock; a stale lock (dead pid or older than 24 h) is taken over.
    pub fn acquire(path: &Path, user_id: impl Into<String>) -> BeamResult<Self> {
        let lock_path = lock_path_for(path);
        let info = LockInfo::new(user_id);

        if lock_path.exists() {
            if let Ok(existing) = read_lock_info(&lock_path) {
                if !is_lock_stale(&existing) {
                    return Err(BeamError::file_locked(
                        path.display().to_string(),
                        format!("{} ({})", existing.user_id, existing.machine),
                        existing.locked_at.to_rfc3339(),
                    ));
                }
            }
        }

        let mut lock_file = OpenOptions::new()
            .write(true)
            .read(true)
            .create(true)
            .truncate(true)
            .open(&lock_path)
            .map_err(|e| {
                BeamError::file_error("create lock", lock_path.display().to_string(), e.to_string())
            })?;

        lock_file.try_lock_exclusive().map_err(|_| {
            BeamError::file_locked(
                path.display().to_string(),
                "another process".to_string(),
                "unknown".to_string(),
            )
        })?;

        let lock_json =
            serde_json::to_string_pretty(&info).map_err(|e| BeamError::SerializationError {
                reason: e.to_string(),
            })?;
        lock_file.write_all(lock_json.as_bytes()).map_err(|e| {
            BeamError::file_error("write lock", lock_path.display().to_string(), e.to_string())
        })?;
        lock_file.sync_all().map_err(|e| {
            BeamError::file_error("sync lock", lock_path.display().to_string(), e.to_string())
        })?;

        Ok(FileLock {
            lock_path,
            _lock_file: lock_file,
            info,
        })
    }

    /// Check whether a library file is locked, without acquiring the lock
    pub fn check(path: &Path) -> Option<LockInfo> {
        let lock_path = lock_path_for(path);
        if lock_path.exists() {
            if let Ok(info) = read_lock_info(&lock_path) {
                if !is_lock_stale(&info) {
                    return Some(info);
                }
            }
        }
        None
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.lock_path);
        // OS lock releases with _lock_file
    }
}

fn lock_path_for(path: &Path) -> PathBuf {
    let mut lock_path = path.to_path_buf();
    let extension = lock_path
        .extension()
        .map(|e| format!("{}.lock", e.to_string_lossy()))
        .unwrap_or_else(|| "lock".to_string());
    lock_path.set_extension(extension);
    lock_path
}

fn read_lock_info(lock_path: &Path) -> BeamResult<LockInfo> {
    let mut contents = String::new();
    File::open(lock_path)
        .and_then(|mut f| f.read_to_string(&mut contents))
        .map_err(|e| {
            BeamError::file_error("read lock", lock_path.display().to_string(), e.to_string())
        })?;
    serde_json::from_str(&contents).map_err(|e| BeamError::SerializationError {
        reason: e.to_string(),
    })
}

/// A lock is stale when its process died on this machine or it is over a day old
fn is_lock_stale(info: &LockInfo) -> bool {
    #[cfg(unix)]
    {
        if let Some(our_machine) = hostname() {
            if info.machine == our_machine
                && fs::metadata(format!("/proc/{}", info.pid)).is_err()
            {
                return true;
            }
        }
    }

    let age = Utc::now() - info.locked_at;
    age.num_hours() > 24
}

/// Save a library with atomic write semantics: serialize, write to `.tmp`,
/// fsync, rename. An interrupted save never corrupts the existing file.
pub fn save_library(library: &BeamLibrary, path: &Path) -> BeamResult<()> {
    let json =
        serde_json::to_string_pretty(library).map_err(|e| BeamError::SerializationError {
            reason: e.to_string(),
        })?;

    let tmp_path = path.with_extension("json.tmp");

    let mut tmp_file = File::create(&tmp_path).map_err(|e| {
        BeamError::file_error("create temp file", tmp_path.display().to_string(), e.to_string())
    })?;
    tmp_file.write_all(json.as_bytes()).map_err(|e| {
        BeamError::file_error("write temp file", tmp_path.display().to_string(), e.to_string())
    })?;
    tmp_file.sync_all().map_err(|e| {
        BeamError::file_error("sync temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        BeamError::file_error("rename to final", path.display().to_string(), e.to_string())
    })?;

    Ok(())
}

/// Load a library from a file, validating the schema version.
pub fn load_library(path: &Path) -> BeamResult<BeamLibrary> {
    let mut contents = String::new();
    File::open(path)
        .and_then(|mut f| f.read_to_string(&mut contents))
        .map_err(|e| BeamError::file_error("read", path.display().to_string(), e.to_string()))?;

    let library: BeamLibrary =
        serde_json::from_str(&contents).map_err(|e| BeamError::SerializationError {
            reason: format!("Invalid JSON in {}: {}", path.display(), e),
        })?;

    validate_version(&library.meta.version)?;

    Ok(library)
}

/// Major version must match; within 0.x a newer minor is also rejected.
fn validate_version(file_version: &str) -> BeamResult<()> {
    let file_parts: Vec<u32> = file_version
        .split('.')
        .filter_map(|p| p.parse().ok())
        .collect();
    let current_parts: Vec<u32> = SCHEMA_VERSION
        .split('.')
        .filter_map(|p| p.parse().ok())
        .collect();

    let mismatch = || BeamError::VersionMismatch {
        file_version: file_version.to_string(),
        expected_version: SCHEMA_VERSION.to_string(),
    };

    if file_parts.is_empty() || current_parts.is_empty() {
        return Err(mismatch());
    }
    if file_parts[0] != current_parts[0] {
        return Err(mismatch());
    }
    if current_parts[0] == 0
        && file_parts.len() > 1
        && current_parts.len() > 1
        && file_parts[1] > current_parts[1]
    {
        return Err(mismatch());
    }

    Ok(())
}
