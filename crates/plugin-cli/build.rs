use anyhow::Result;
use vergen_gitcl::{BuildBuilder, Emitter, GitclBuilder};

// Emits VERGEN_BUILD_DATE and VERGEN_GIT_SHA for `cpo info`.
fn main() -> Result<()> {
    let build = BuildBuilder::default().build_date(true).build()?;
    let git = GitclBuilder::default().sha(false).build()?;

    Emitter::default()
        .add_instructions(&build)?
        .add_instructions(&git)?
        .emit()?;

    Ok(())
}
