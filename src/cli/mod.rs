mod plan;
mod recipe;

pub use plan::*;
pub use recipe::*;

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);

    Ok(())
}
