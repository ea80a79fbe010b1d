fn main() -> anyhow::Result<()> {
    sessionbench::run()
}
