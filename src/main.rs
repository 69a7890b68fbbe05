use flint::engine::uci::Uci;

pub fn main() {
    // diagnostics go to stderr; stdout carries only protocol lines
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let mut uci = Uci::new();
    uci.run();
}
