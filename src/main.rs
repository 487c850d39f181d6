use mini_jbod::{logger, Config};

use crate::shell::start_shell;

mod shell;
mod utils;

fn main() {
    logger::init();
    start_shell(Config::from_env());
}
