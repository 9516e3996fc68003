mod cmd;

use argp::FromArgs;
use tracing_subscriber::{EnvFilter, filter::LevelFilter};
use typed_path::Utf8NativePathBuf;

#[derive(FromArgs, PartialEq, Debug)]
/// Score GitHub repositories on code quality, community and maintenance.
struct TopLevel {
    #[argp(subcommand)]
    command: SubCommand,
    #[argp(
        option,
        short = 'c',
        default = "Utf8NativePathBuf::from(\"config.yml\")",
        from_str_fn(native_path)
    )]
    /// config file (defaults are used when it does not exist)
    config: Utf8NativePathBuf,
}

#[derive(FromArgs, PartialEq, Debug)]
#[argp(subcommand)]
enum SubCommand {
    Analyze(cmd::analyze::Args),
}

// For argp::FromArgs
pub fn native_path(value: &str) -> Result<Utf8NativePathBuf, String> {
    Ok(Utf8NativePathBuf::from(value))
}

#[tokio::main]
async fn main() {
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();
    tracing_subscriber::fmt().with_env_filter(env_filter).with_writer(std::io::stderr).init();

    let args: TopLevel = argp::parse_args_or_exit(argp::DEFAULT);
    let result = match args.command {
        SubCommand::Analyze(command) => cmd::analyze::run(&args.config, command).await,
    };
    if let Err(e) = result {
        tracing::error!("{e:?}");
        std::process::exit(1);
    }
}
