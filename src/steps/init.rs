use std::path::PathBuf;

use crate::config::{PipelineConfig, ProjectLayout};
use crate::encoding::{self, EncodePolicy, TextEncoding};
use crate::error::{PipelineError, PipelineResult};
use crate::outcome::{Step, StepOutcome};

/// A sample text file written into `data/raw/`.
#[derive(Debug, Clone, Copy)]
pub struct SampleFile {
    pub name: &'static str,
    pub encoding: TextEncoding,
    pub policy: EncodePolicy,
    pub content: &'static str,
}

/// Sample files, one per supported encoding.
///
/// Latin-1 cannot represent the em dash or Cyrillic, so that sample is
/// written with unencodable characters dropped.
pub const SAMPLES: [SampleFile; 3] = [
    SampleFile {
        name: "file_utf8.txt",
        encoding: TextEncoding::Utf8,
        policy: EncodePolicy::Strict,
        content: "Привет, мир! Hello world! Это файл в кодировке UTF-8.",
    },
    SampleFile {
        name: "file_latin1.txt",
        encoding: TextEncoding::Latin1,
        policy: EncodePolicy::Ignore,
        content: "Bonjour le monde! Ola mundo! ÆØÅ — пример символов latin-1.",
    },
    SampleFile {
        name: "file_cp1251.txt",
        encoding: TextEncoding::Windows1251,
        policy: EncodePolicy::Strict,
        content: "Это пример файла в кодировке cp1251. Старые добрые времена Windows :)",
    },
];

/// Handle the `init` step: create the project layout and sample files.
pub async fn handle(config: &PipelineConfig) -> StepOutcome {
    let layout = config.layout();
    super::run_blocking(Step::Init, config.step_timeout, move || {
        let dirs = create_directories(&layout)?;
        let samples = write_samples(&layout)?;

        tracing::info!(
            directories = dirs.len(),
            samples = samples.len(),
            "project layout and sample files created"
        );

        let mut lines = vec![format!(
            "Project layout ready under {}",
            layout.root().display()
        )];
        lines.extend(
            samples
                .iter()
                .map(|path| format!("Sample written: {}", path.display())),
        );
        Ok(StepOutcome::ok(Step::Init, lines))
    })
    .await
}

/// Create every layout directory. Existing directories are left alone.
pub fn create_directories(layout: &ProjectLayout) -> PipelineResult<Vec<PathBuf>> {
    let dirs = layout.directories();
    for dir in &dirs {
        std::fs::create_dir_all(dir).map_err(|e| PipelineError::io(dir, e))?;
        tracing::info!(path = %dir.display(), "directory checked/created");
    }
    Ok(dirs)
}

/// Write [`SAMPLES`] into `data/raw/`, overwriting previous copies.
pub fn write_samples(layout: &ProjectLayout) -> PipelineResult<Vec<PathBuf>> {
    let raw_dir = layout.raw_dir();
    let mut written = Vec::with_capacity(SAMPLES.len());

    for sample in &SAMPLES {
        let bytes = encoding::encode(sample.content, sample.encoding, sample.policy)?;
        let path = raw_dir.join(sample.name);
        std::fs::write(&path, bytes).map_err(|e| PipelineError::io(&path, e))?;
        tracing::info!(path = %path.display(), encoding = %sample.encoding, "sample file created");
        written.push(path);
    }

    Ok(written)
}
