use clap::Args;

use crate::cli::{utils, OutputFormat};
use crate::services::asset_code::{next_code, CodeRequest};

#[derive(Args)]
pub struct NextCodeArgs {
    #[arg(long, help = "Category prefix, e.g. LAP")]
    pub prefix: String,

    #[arg(long, help = "Brand; the first four letters are used")]
    pub brand: Option<String>,

    #[arg(long, help = "Purchase year (defaults to the current year)")]
    pub year: Option<i32>,

    #[arg(long, help = "Use the dummy sequence (90001 and up)")]
    pub dummy: bool,

    #[arg(long = "after", help = "Existing code to continue from (repeatable)")]
    pub after: Vec<String>,
}

/// Offline preview: no database, only the codes given with `--after`.
pub fn handle(args: NextCodeArgs, output_format: &OutputFormat) -> anyhow::Result<()> {
    let mut request = CodeRequest::new(&args.prefix, args.brand.as_deref(), None, args.dummy);
    if let Some(year) = args.year {
        request.year = year;
    }

    let stem = request.stem()?;
    let code = next_code(&stem, request.sequence(), args.after.iter().map(String::as_str))?;
    utils::output_value(output_format, "assetCode", &code)
}
