// Conversion pipeline: parse, normalize, derive, build, assemble, serialize, write

pub mod output;
pub mod processing;

use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, instrument};

use crate::config::Config;
use crate::constants::EVENTID;
use crate::error::Result;
use crate::types::EventRecord;
use output::{serializer_for, write_atomically, OutputFormat};
use processing::catalog::{assemble_catalog, AssembledCatalog, EntityBuilder};
use processing::derive::FieldDeriver;
use processing::normalize::{CaseNormalizer, Normalizer};
use processing::parser::{read_record, resolve_output_path};

/// Result of converting one input file
#[derive(Debug, Clone, Serialize)]
pub struct ConversionResult {
    pub eventid: String,
    pub output_file: PathBuf,
    pub format: String,
    pub pick_count: usize,
    pub bytes_written: usize,
}

/// Runs every stage in order and stops at the first failure. Nothing is
/// written unless every stage before the write succeeded.
pub struct ConversionPipeline<'a> {
    config: &'a Config,
    normalizer: CaseNormalizer,
    deriver: FieldDeriver,
}

impl<'a> ConversionPipeline<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self {
            config,
            normalizer: CaseNormalizer::new(),
            deriver: FieldDeriver::new(config.identifiers.authority.clone()),
        }
    }

    /// Convert an in-memory record into an assembled catalog.
    /// The record is left normalized with its derived fields filled in.
    pub fn convert(&self, record: &mut EventRecord) -> Result<AssembledCatalog> {
        self.normalizer.normalize(record);
        self.deriver.derive(record)?;
        debug!("Record has {} fields after derivation", record.len());

        let built = EntityBuilder::new(self.config).build(record)?;
        assemble_catalog(record, built)
    }

    /// Convert the file at `input` and write the catalog. Returns where it went.
    #[instrument(skip(self, explicit_output), fields(input = %input.display(), format = %format))]
    pub fn run(
        &self,
        input: &Path,
        explicit_output: Option<&Path>,
        format: OutputFormat,
    ) -> Result<ConversionResult> {
        let started = Instant::now();
        info!("🚀 Converting {} to {}", input.display(), format);

        let mut record = read_record(input)?;
        let assembled = self.convert(&mut record)?;

        let serializer = serializer_for(format, self.config.output.indent);
        let bytes = serializer.serialize(&assembled.catalog, &assembled.namespaces)?;

        let output_file = resolve_output_path(
            input,
            explicit_output,
            &record,
            &self.config.output.extension,
        );
        write_atomically(&output_file, &bytes)?;

        let result = ConversionResult {
            eventid: record.get(EVENTID).unwrap_or_default().to_string(),
            output_file,
            format: serializer.format().to_string(),
            pick_count: assembled
                .catalog
                .events
                .iter()
                .map(|event| event.picks.len())
                .sum(),
            bytes_written: bytes.len(),
        };
        info!(
            "✅ Wrote {} ({} bytes) in {:.3}s",
            result.output_file.display(),
            result.bytes_written,
            started.elapsed().as_secs_f64()
        );
        Ok(result)
    }
}

/// Convert `input` with `config`, choosing the format from the config
/// unless `format` overrides it
pub fn run_conversion(
    input: &Path,
    explicit_output: Option<&Path>,
    format: Option<OutputFormat>,
    config: &Config,
) -> Result<ConversionResult> {
    let format = format.unwrap_or(config.output.format);
    ConversionPipeline::new(config).run(input, explicit_output, format)
}
