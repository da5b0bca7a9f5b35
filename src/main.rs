use clap::Parser;
use log::{error, info};
use simple_logger::init_with_level;

use humannpipe::{
    cli::{Args, NormArgs, RenameArgs, RunArgs, SubArgs, ValidateArgs},
    config::Config,
    consts::*,
    core::{self, rename, renorm},
    executor::LocalExecutor,
    table::PooledTable,
    Result,
};

fn main() {
    let start = std::time::Instant::now();
    let args: Args = Args::parse();

    if let Err(e) = init_with_level(args.log_level()) {
        eprintln!("ERROR: could not initialize logger: {}", e);
    }

    let result = match args.command {
        SubArgs::Run { args } => run(args),
        SubArgs::Validate { args } => validate(args),
        SubArgs::RenamePathways { args } => rename_with(args, rename::rename_pathways),
        SubArgs::RenameGeneFamilies { args } => rename_with(args, rename::rename_gene_families),
        SubArgs::Cpm { args } => normalize_with(args, renorm::cpm),
        SubArgs::Relab { args } => normalize_with(args, renorm::relab),
    };

    result.unwrap_or_else(|e| {
        error!("{}", e);
        std::process::exit(1);
    });

    let elapsed = start.elapsed();
    info!("Elapsed time: {:.3?}", elapsed);
}

fn run(args: RunArgs) -> Result<()> {
    let mut config = Config::read(args.config.clone())?;
    config.aware(&args).validate()?;

    if !config.metadata.is_empty() {
        info!("INFO: run metadata {:?}", config.metadata);
    }

    let request = config.request()?;
    let mut executor = LocalExecutor::with_packages(config.packages.clone());
    executor.check(&[HUMANN, JOIN_TABLES, RENORM_TABLE, MERGE_METAPHLAN])?;

    let outputs = core::run(&request, &mut executor)?;

    let output_dir = config.create_global_output_dir()?;
    for path in outputs.write_all(&output_dir)? {
        info!("INFO: wrote {}", path.display());
    }

    Ok(())
}

fn validate(args: ValidateArgs) -> Result<()> {
    let config = Config::read(args.config)?;
    let request = config.request()?;

    info!(
        "SUCCESS: {} samples, bowtie2 index '{}' in {}",
        request.samples.len(),
        request.databases.bowtie2.basename,
        request.databases.bowtie2.dir.display()
    );

    if args.check_tools {
        LocalExecutor::with_packages(config.packages).check(&[
            HUMANN,
            JOIN_TABLES,
            RENORM_TABLE,
            RENAME_TABLE,
            MERGE_METAPHLAN,
        ])?;
        info!("SUCCESS: all external tools found");
    }

    Ok(())
}

fn rename_with<F>(args: RenameArgs, rename: F) -> Result<()>
where
    F: Fn(&PooledTable, &rename::RenameParams, &mut dyn humannpipe::executor::Executor) -> Result<PooledTable>,
{
    let table = PooledTable::read(&args.input)?;
    let renamed = rename(&table, &args.params(), &mut LocalExecutor::new())?;
    renamed.write(&args.output)?;

    info!("INFO: wrote {}", args.output.display());
    Ok(())
}

fn normalize_with<F>(args: NormArgs, normalize: F) -> Result<()>
where
    F: Fn(&PooledTable, renorm::NormMode, &mut dyn humannpipe::executor::Executor) -> Result<PooledTable>,
{
    let table = PooledTable::read(&args.input)?;
    let normalized = normalize(&table, args.mode, &mut LocalExecutor::new())?;
    normalized.write(&args.output)?;

    info!("INFO: wrote {}", args.output.display());
    Ok(())
}
