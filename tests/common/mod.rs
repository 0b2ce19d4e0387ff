#![allow(dead_code, clippy::unwrap_used)]

use std::fs;
use std::path::{Path, PathBuf};

use gogen::generator::{GenerationRequest, GeneratorKind};
use tempfile::TempDir;

/// A package whose files all live in one temporary directory.
pub struct Fixture {
    pub dir: TempDir,
}

impl Fixture {
    pub fn new(files: &[(&str, &str)]) -> Self {
        let dir = tempfile::tempdir().unwrap();
        for (name, src) in files {
            fs::write(dir.path().join(name), src).unwrap();
        }
        Fixture { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn pattern(&self) -> String {
        self.dir.path().display().to_string()
    }

    pub fn file(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn read(&self, name: &str) -> String {
        fs::read_to_string(self.file(name)).unwrap()
    }

    /// Request pinned to Go 1.21 with a stable header.
    pub fn request(&self, kind: GeneratorKind, types: &str) -> GenerationRequest {
        let mut req = GenerationRequest::new(kind, types, vec![self.pattern()]);
        req.settings.go_minor = 21;
        req.scan.go_minor = 21;
        req.args = vec![kind.name().to_string(), "-t".to_string(), types.to_string()];
        req
    }
}

pub const CLINIC: &str = "package clinic

import (
\t\"database/sql\"
\t\"time\"
)

// Patient is stored in the patients table.
type Patient struct {
\tID        int64
\tFullName  string
\tBorn      time.Time
\tNotes     sql.NullString `db:\"-\" option:\"-\" union:\"-\"`
\tAllergies []string
}

type Color int

const (
\tColorRed Color = iota
\tColorGreen
\tColorBlue
)

type Ward struct {
\tPatient *Patient
\tNurse   string
\tBeds    []int
\tSecret  string `union:\"-\"`
}
";

pub const SYNC: &str = "package clinic

import (
\t\"sync\"
\t\"sync/atomic\"
)

type Beds sync.Map

type Roster atomic.Value
";
