use anyhow::Result;
use vergen::EmitBuilder;

// VERGEN_GIT_SHA and VERGEN_GIT_COMMIT_DATE feed the CLI's --version output.
fn main() -> Result<()> {
    EmitBuilder::builder()
        .git_sha(true)
        .git_commit_date()
        .emit()?;
    Ok(())
}
