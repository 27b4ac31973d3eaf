use fsplit::application;
use fsplit_core::error::Result;

fn main() -> Result<()> {
    application::run()
}
