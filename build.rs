use vergen_gitcl::{CargoBuilder, Emitter, GitclBuilder};

fn main() -> Result<(), Box<dyn std::error::Error>> {
	let mut emitter = Emitter::default();

	emitter.add_instructions(&CargoBuilder::default().target_triple(true).build()?)?;
	emitter.add_instructions(&GitclBuilder::default().sha(true).build()?)?;
	emitter.emit()?;

	Ok(())
}
