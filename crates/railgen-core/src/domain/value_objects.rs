//! Domain value objects: Database, BuildTool, PackageManager, Version.
//!
//! # Design
//!
//! These are pure value types: `Copy` where possible, equality-by-value, no
//! identity. Each carries its canonical string form and a `FromStr` parser
//! that returns a [`DomainError`] naming the accepted values.

use crate::domain::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ── Database ──────────────────────────────────────────────────────────────────

/// Database backing the generated Rails application.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    #[default]
    Postgresql,
    Sqlite,
}

impl Database {
    pub const ALL: [Self; 2] = [Self::Postgresql, Self::Sqlite];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Postgresql => "postgresql",
            Self::Sqlite => "sqlite",
        }
    }

    /// The ActiveRecord adapter name written into `database.yml`.
    pub const fn adapter(&self) -> &'static str {
        match self {
            Self::Postgresql => "postgresql",
            Self::Sqlite => "sqlite3",
        }
    }
}

impl fmt::Display for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Database {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "postgresql" | "postgres" | "pg" => Ok(Self::Postgresql),
            "sqlite" | "sqlite3" => Ok(Self::Sqlite),
            other => Err(DomainError::InvalidField {
                field: "database",
                value: other.to_string(),
                expected: "'postgresql' or 'sqlite'",
            }),
        }
    }
}

// ── BuildTool ─────────────────────────────────────────────────────────────────

/// Bundler used by the React frontend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildTool {
    #[default]
    Vite,
    Webpack,
}

impl BuildTool {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Vite => "vite",
            Self::Webpack => "webpack",
        }
    }

    /// Port the frontend dev server listens on.
    pub const fn dev_port(&self) -> u16 {
        match self {
            Self::Vite => 5173,
            Self::Webpack => 8080,
        }
    }

    /// `package.json` scripts as `(dev, build)`.
    pub const fn scripts(&self) -> (&'static str, &'static str) {
        match self {
            Self::Vite => ("vite", "vite build"),
            Self::Webpack => ("webpack serve --mode development", "webpack --mode production"),
        }
    }

    /// `devDependencies` lines for `package.json`, trailing comma included.
    pub const fn dev_dependencies(&self) -> &'static str {
        match self {
            Self::Vite => "\"@vitejs/plugin-react\": \"^4.2.0\",\n    \"vite\": \"^5.0.0\",",
            Self::Webpack => {
                "\"webpack\": \"^5.89.0\",\n    \"webpack-cli\": \"^5.1.4\",\n    \"webpack-dev-server\": \"^4.15.1\",\n    \"html-webpack-plugin\": \"^5.5.3\",\n    \"babel-loader\": \"^9.1.3\","
            }
        }
    }

    /// Body of `<tool>.config.js`.
    pub const fn config_file(&self) -> &'static str {
        match self {
            Self::Vite => {
                "import { defineConfig } from 'vite'\nimport react from '@vitejs/plugin-react'\n\nexport default defineConfig({\n  plugins: [react()],\n  server: {\n    port: 5173,\n    proxy: { '/graphql': 'http://localhost:3000' },\n  },\n})\n"
            }
            Self::Webpack => {
                "const HtmlWebpackPlugin = require('html-webpack-plugin')\n\nmodule.exports = {\n  entry: './src/main',\n  resolve: { extensions: ['.tsx', '.ts', '.jsx', '.js'] },\n  module: {\n    rules: [{ test: /\\.[jt]sx?$/, exclude: /node_modules/, use: 'babel-loader' }],\n  },\n  plugins: [new HtmlWebpackPlugin({ template: './index.html' })],\n  devServer: {\n    port: 8080,\n    proxy: [{ context: ['/graphql'], target: 'http://localhost:3000' }],\n  },\n}\n"
            }
        }
    }
}

impl fmt::Display for BuildTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BuildTool {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "vite" => Ok(Self::Vite),
            "webpack" => Ok(Self::Webpack),
            other => Err(DomainError::InvalidField {
                field: "build tool",
                value: other.to_string(),
                expected: "'vite' or 'webpack'",
            }),
        }
    }
}

// ── PackageManager ────────────────────────────────────────────────────────────

/// JavaScript package manager named in generated scripts and docs.
///
/// Never invoked by railgen itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageManager {
    #[default]
    Pnpm,
    Npm,
    Yarn,
}

impl PackageManager {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pnpm => "pnpm",
            Self::Npm => "npm",
            Self::Yarn => "yarn",
        }
    }

    /// Command used to run a package script, e.g. `npm run dev`.
    pub const fn run_prefix(&self) -> &'static str {
        match self {
            Self::Pnpm => "pnpm",
            Self::Npm => "npm run",
            Self::Yarn => "yarn",
        }
    }
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PackageManager {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pnpm" => Ok(Self::Pnpm),
            "npm" => Ok(Self::Npm),
            "yarn" => Ok(Self::Yarn),
            other => Err(DomainError::InvalidField {
                field: "package manager",
                value: other.to_string(),
                expected: "'pnpm', 'npm', or 'yarn'",
            }),
        }
    }
}

// ── Version ───────────────────────────────────────────────────────────────────

/// A strict `major.minor.patch` version string.
///
/// Invariant: three dot-separated, non-empty runs of ASCII digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Version(String);

impl Version {
    pub fn parse(field: &'static str, raw: &str) -> Result<Self, DomainError> {
        let parts: Vec<&str> = raw.split('.').collect();
        let well_formed = parts.len() == 3
            && parts
                .iter()
                .all(|p| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit()));

        if well_formed {
            Ok(Self(raw.to_string()))
        } else {
            Err(DomainError::InvalidField {
                field,
                value: raw.to_string(),
                expected: "format x.y.z",
            })
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Version {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse("version", &value)
    }
}

impl From<Version> for String {
    fn from(v: Version) -> Self {
        v.0
    }
}
