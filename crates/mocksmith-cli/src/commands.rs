use std::path::{Path, PathBuf};
use std::time::Instant;

use mocksmith_core::{Locale, MockConfig, Template, TypeRef, TypeRegistry};
use mocksmith_generate::{MockOptions, builtin_registry};
use mocksmith_introspect::Mocker;
use serde_json::Value;
use tracing::info;

use crate::config::FileConfig;
use crate::output::emit;
use crate::{CliError, IntrospectArgs, OutputArgs, RenderArgs};

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Seed for document `index` of a multi-document run; document 0 keeps the base seed.
pub fn document_seed(base: u64, index: usize) -> u64 {
    if index == 0 {
        return base;
    }
    let mut hash = FNV_OFFSET;
    for byte in base.to_le_bytes().into_iter().chain((index as u64).to_le_bytes()) {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

/// Resolved output settings: flags first, then the `[render]` table.
struct Output {
    count: usize,
    seed: Option<u64>,
    locale: Option<Locale>,
    pretty: bool,
    out: Option<PathBuf>,
}

impl Output {
    fn resolve(args: OutputArgs, file: &FileConfig) -> Result<Self, CliError> {
        let count = args.count.or(file.render.count).unwrap_or(1);
        if count == 0 {
            return Err(CliError::InvalidConfig("--count must be at least 1".to_string()));
        }
        Ok(Self {
            count,
            seed: args.seed.or(file.render.seed).or(file.mock.seed),
            locale: args
                .locale
                .or_else(|| file.render.locale.clone())
                .or_else(|| file.mock.locale.clone()),
            pretty: args.pretty || file.render.pretty,
            out: args.out,
        })
    }

    fn seed_for(&self, index: usize) -> Option<u64> {
        self.seed.map(|seed| document_seed(seed, index))
    }

    /// One document as-is, several as an array.
    fn emit(&self, mut documents: Vec<Value>) -> Result<(), CliError> {
        let value = if documents.len() == 1 {
            documents.remove(0)
        } else {
            Value::Array(documents)
        };
        emit(&value, self.pretty, self.out.as_deref())
    }
}

pub fn run_render(args: RenderArgs, file: &FileConfig, mocker: &Mocker) -> Result<(), CliError> {
    let template: Template = read_json(&args.template)?;
    let output = Output::resolve(args.output, file)?;
    info!(
        event = "render_started",
        template = %args.template.display(),
        count = output.count,
        seed = ?output.seed
    );
    let timer = Instant::now();

    let documents: Vec<Value> = (0..output.count)
        .map(|index| {
            let options = MockOptions {
                seed: output.seed_for(index),
                locale: output.locale.clone(),
            };
            mocker.mock_with(&template, &options)
        })
        .collect();
    output.emit(documents)?;

    info!(
        event = "render_finished",
        duration_ms = timer.elapsed().as_millis() as u64
    );
    Ok(())
}

pub fn run_introspect(
    args: IntrospectArgs,
    file: &FileConfig,
    mocker: &Mocker,
) -> Result<(), CliError> {
    let catalog: TypeRegistry = read_json(&args.catalog)?;
    let ty: TypeRef = args.type_name.parse()?;
    let output = Output::resolve(args.output, file)?;

    let mut config = file.mock.clone();
    if let Some(max_depth) = args.max_depth {
        config.max_depth = max_depth;
    }
    if let Some(size) = args.max_collection_size {
        config.max_collection_size = size;
    }
    if let Some(length) = args.max_string_length {
        config.max_string_length = length;
    }
    config.include_private |= args.include_private;
    config.include_static |= args.include_static;
    config.include_transient |= args.include_transient;
    config.locale = output.locale.clone();

    info!(
        event = "introspection_started",
        catalog = %args.catalog.display(),
        types = catalog.len(),
        target_type = %ty
    );

    if args.template_only {
        let template = mocker.template_for(&catalog, &ty, &config)?;
        return output.emit(vec![template]);
    }

    let documents = (0..output.count)
        .map(|index| {
            let config = MockConfig {
                seed: output.seed_for(index),
                ..config.clone()
            };
            mocker
                .mock_type(&catalog, &ty, &config)
                .map(|instance| instance.to_json())
        })
        .collect::<Result<Vec<_>, _>>()?;
    output.emit(documents)?;

    info!(event = "introspection_finished", target_type = %ty);
    Ok(())
}

pub fn run_placeholders(mocker: &Mocker) -> Result<(), CliError> {
    let mut names: Vec<String> = builtin_registry().names().map(str::to_string).collect();
    names.sort();
    let extended = mocker.extended().extended_names();
    let document = serde_json::json!({
        "builtin": names,
        "extended": extended,
    });
    emit(&document, true, None)
}

pub fn run_schema() -> Result<(), CliError> {
    let schema = schemars::schema_for!(FileConfig);
    emit(&serde_json::to_value(schema)?, true, None)
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, CliError> {
    let content = std::fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&content)?)
}
