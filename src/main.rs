fn main() -> anyhow::Result<()> {
    soli::cli::run_cli()
}
