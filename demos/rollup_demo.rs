use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    sales_rollup::example_apps::run_rollup_demo(std::env::args().skip(1))
}
