use diffview::run;
use miette::Result;

fn main() -> Result<()> {
    run()
}
