fn main() -> std::process::ExitCode {
    launchicube_lib::run()
}
