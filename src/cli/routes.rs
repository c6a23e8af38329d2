use clap::Args;

use crate::config::Application;
use crate::core::route::RouteTable;
use crate::Result;

/// Print the ordered route table
#[derive(Args, Debug)]
pub struct RoutesCommand {}

impl RoutesCommand {
    pub fn run(self, app: &Application) -> Result<()> {
        let gate = app.navigator.gate();
        println!(
            "{} (sign in {}, home {})",
            app.name,
            gate.sign_in_path(),
            gate.home_path()
        );
        for line in render(app.navigator.table()) {
            println!("{}", line);
        }
        Ok(())
    }
}

fn render(table: &RouteTable) -> Vec<String> {
    table
        .iter()
        .enumerate()
        .map(|(i, route)| match route.name() {
            Some(name) => format!("{:>2}. {} (name {})", i + 1, route, name),
            None => format!("{:>2}. {}", i + 1, route),
        })
        .collect()
}
