//! # autogen compiler
//!
//! Generates the Request/Repository networking layer for annotated Kotlin
//! service interfaces.
//!
//! ## Architecture
//!
//! ```text
//! Source tree (.kt, or .json descriptors)
//!        │
//!        ▼
//! ┌──────────────┐
//! │   Frontend   │  Parse + resolve names
//! │ (→ SourceSet)│
//! └──────┬───────┘
//!        │
//!        ▼
//! ┌──────────────┐
//! │   Analysis   │  Collect @Autogen interfaces,
//! │ (→ ServiceIR)│  extract method descriptors
//! └──────┬───────┘
//!        │
//!        ▼
//! ┌──────────────┐
//! │   Validate   │  Generated-name collisions
//! └──────┬───────┘
//!        │
//!        ▼
//! ┌──────────────┐
//! │   Codegen    │  XRequest + XRepository per interface
//! │  (→ Kotlin)  │
//! └──────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use autogen_compiler::{Generator, GeneratorConfig};
//!
//! let config = GeneratorConfig {
//!     source_dir: "app/src/main/java".into(),
//!     out_dir: "app/build/generated/source/autogen".into(),
//!     ..GeneratorConfig::default()
//! };
//!
//! let result = Generator::new(config).generate()?;
//! println!("{} interfaces", result.interfaces);
//! ```

pub mod analysis;
pub mod codegen;
pub mod config;
pub mod diagnostic;
pub mod frontend;
pub mod ir;
pub mod output;
pub mod validate;

pub use config::{Conventions, GeneratorConfig};
pub use diagnostic::GeneratorError;
pub use output::WriteSummary;

/// Runs the generation pipeline for one configuration.
pub struct Generator {
    config: GeneratorConfig,
}

/// Result of a generation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateResult {
    /// Number of annotated interfaces processed
    pub interfaces: usize,
    /// Number of service methods across all interfaces
    pub methods: usize,
    /// Number of generated files
    pub files: usize,
    /// Files written this pass
    pub written: usize,
    /// Files left alone because their contents were already current
    pub unchanged: usize,
}

impl Generator {
    /// Creates a new generator with the given configuration.
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    /// Reads the source tree and returns the validated services.
    ///
    /// This runs the analysis half of the pipeline:
    /// 1. Create frontend for the configured language
    /// 2. Parse source files into declarations
    /// 3. Collect annotated interfaces and extract their methods
    /// 4. Validate generated names
    pub fn analyze(&self) -> Result<Vec<ir::ServiceIR>, GeneratorError> {
        let conventions = &self.config.conventions;

        // Phase 1: Create frontend
        let mut frontend = frontend::create_frontend(&self.config.language, conventions)?;

        // Phase 2: Parse files
        let source_set = frontend.parse_directory(&self.config.source_dir)?;

        // Phase 3: Collect + extract
        let services = analysis::analyze(&source_set, conventions);

        // Phase 4: Validate
        validate::validate_services(&services, conventions)?;

        Ok(services)
    }

    /// Analyzes and renders everything in memory without writing.
    pub fn check(&self) -> Result<(Vec<ir::ServiceIR>, codegen::GeneratedCode), GeneratorError> {
        let services = self.analyze()?;
        let generated = codegen::generate(&services, &self.config.conventions);
        Ok((services, generated))
    }

    /// Runs the full pipeline and writes the generated files.
    ///
    /// All files are rendered before the first write.
    #[tracing::instrument(skip_all, fields(source = %self.config.source_dir.display()))]
    pub fn generate(&self) -> Result<GenerateResult, GeneratorError> {
        let (services, generated) = self.check()?;
        let summary = output::write_output(&self.config.out_dir, &generated)?;

        let result = GenerateResult {
            interfaces: services.len(),
            methods: services.iter().map(|s| s.methods.len()).sum(),
            files: generated.files.len(),
            written: summary.written,
            unchanged: summary.unchanged,
        };
        tracing::info!(
            interfaces = result.interfaces,
            written = result.written,
            unchanged = result.unchanged,
            "generation finished"
        );
        Ok(result)
    }
}
