use userio::{
    cli::{init_logging, parse_cli, Runner},
    error::default_error_handler,
};

fn main() {
    let cli = parse_cli();
    init_logging(cli.verbose, cli.log_file.as_deref());

    if let Err(err) = Runner::new(cli).run() {
        default_error_handler(err);
    }
}
