fn main() -> anyhow::Result<()> {
    gdcodegen::run()
}
