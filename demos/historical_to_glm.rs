//! Fetches a month of ERA5 data for a lake in south-west Western Australia,
//! converts it to a GLM met file and writes both forms to `./glm-out`.

use glm_met::{
    BlockingHttpClient, DateRange, GlmMetError, GlmOutput, Historical, LonLat, MetAdapter,
    QueryParams,
};
use std::env;
use std::path::Path;

fn main() -> Result<(), GlmMetError> {
    configure_polars_display();
    let client = BlockingHttpClient::builder().build()?;

    let mut adapter = Historical::builder()
        .location(LonLat::new(116.75, -34.25)?)
        .date_range(DateRange::parse("2020-01-01", "2020-01-31")?)
        .build();

    // Snap to the nearest land cell instead of the default blend.
    let extras = QueryParams::new().with("cell_selection", "land");
    let raw = adapter.fetch(&client, Some(&extras))?;
    println!("Fetched {} rows, metadata: {:#?}", raw.row_count(), raw.metadata());

    let table = adapter.convert()?;
    println!("{}", table.frame());

    let out = Path::new("glm-out");
    let raw_path = adapter.export_raw(out)?;
    let glm_path = adapter.export_canonical(out, &GlmOutput::Archive)?;
    println!("Wrote {} and {}", raw_path.display(), glm_path.display());

    Ok(())
}

fn configure_polars_display() {
    // show every column
    env::set_var("POLARS_FMT_MAX_COLS", "-1");
    // show 20 rows
    env::set_var("POLARS_FMT_MAX_ROWS", "20");
}
