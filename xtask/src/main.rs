use clap::Parser;
use xshell::cmd;

#[derive(Debug, clap::Args)]
struct BuildArgs {
    #[arg(long, short)]
    release: bool,
}

#[derive(Debug, clap::Args)]
struct ServeArgs {
    #[command(flatten)]
    build_args: BuildArgs,

    /// VideoHQ server receiving the `/api` requests of the site
    #[arg(long, default_value = "http://127.0.0.1:5000/api")]
    api: String,

    #[arg(long, default_value_t = 8080)]
    port: u16,
}

#[derive(Debug, clap::Subcommand)]
enum Command {
    /// Build the site and the command line front-end
    Build(BuildArgs),
    /// Serve the site, proxying API requests to a running server
    Serve(ServeArgs),
}

#[derive(Debug, clap::Parser)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

fn build(args: &BuildArgs) -> anyhow::Result<()> {
    let release = args.release.then_some("--release");

    // The site is packaged by trunk into vhq-site/dist
    let shell = xshell::Shell::new()?;
    {
        let _dir = shell.push_dir("vhq-site");
        cmd!(shell, "trunk build {release...}").run()?;
    }

    cmd!(shell, "cargo build {release...} -p vhq-cli").run()?;

    Ok(())
}

fn serve(args: &ServeArgs) -> anyhow::Result<()> {
    let release = args.build_args.release.then_some("--release");
    let api = &args.api;
    let port = args.port.to_string();

    let shell = xshell::Shell::new()?;
    let _dir = shell.push_dir("vhq-site");
    cmd!(
        shell,
        "trunk serve {release...} --port {port} --proxy-backend {api}"
    )
    .run()?;

    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    match &args.command {
        Command::Build(args) => build(args)?,
        Command::Serve(args) => serve(args)?,
    }

    Ok(())
}
