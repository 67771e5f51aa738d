fn main() -> anyhow::Result<()> {
    mmrs_signald::run()
}
