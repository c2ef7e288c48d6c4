use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::Level;

use tablet_relay::config::Config;
use tablet_relay::error::Error;
use tablet_relay::event_router::Router;
use tablet_relay::input_devices::{EvdevSource, describe};
use tablet_relay::tablet_driver::Translator;
use tablet_relay::virtual_device::{CapabilityDescriptor, UinputTablet};

#[derive(Debug, Parser)]
#[command(
    version,
    about,
    after_help = "Usually needs root: sudo tablet-relay /dev/input/eventX\n $ sudo evtest\ncan help you to know which file to use."
)]
struct Args {
    /// Physical device, e.g. /dev/input/event5
    device: PathBuf,

    /// TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log debug output
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long)]
    quiet: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();

    let level = if args.verbose {
        Level::DEBUG
    } else if args.quiet {
        Level::WARN
    } else {
        Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .init();

    let result = tokio::select! {
        result = run(&args) => result,
        _ = tokio::signal::ctrl_c() => Ok(()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => report(&err),
    }
}

/// 设备句柄都归这个函数所有，无论怎么退出都会被 drop
async fn run(args: &Args) -> anyhow::Result<()> {
    use anyhow::Context;

    let config = Config::load_or_default(args.config.as_deref())?;
    let descriptor = CapabilityDescriptor::from_config(&config)?;

    let source = EvdevSource::open(&args.device)?;
    print!("{}", describe(source.device()));

    let tablet = UinputTablet::create(&descriptor, config.device.settle())
        .await
        .context("creating virtual tablet")?;

    let mut router = Router::new(source, Translator::new(config.translator.sync), tablet);
    if config.translator.announce_proximity {
        router.announce()?;
    }

    println!(
        "################################\n\
         #      Waiting for events      #\n\
         ################################"
    );
    router.run().await?;
    Ok(())
}

/// 打印错误并给出退出码
///
/// 没权限和设备不存在是用户给错了参数，只打印一行说明，按正常退出处理 (0)。
/// 其他错误带上完整的 context 链，退出码 1
fn report(err: &anyhow::Error) -> ExitCode {
    match err.downcast_ref::<Error>() {
        Some(err @ (Error::PermissionDenied { .. } | Error::DeviceNotFound { .. })) => {
            eprintln!("{err}");
            ExitCode::SUCCESS
        }
        _ => {
            eprintln!("{err:#}");
            ExitCode::FAILURE
        }
    }
}
