fn main() -> std::io::Result<()> {
    mxedit::run()
}
