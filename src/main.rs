fn main() -> anyhow::Result<()> {
    brrtbind::cli::run_cli()
}
