use clap::Args;

use super::{open_bakery, print_json, CmdResult};

#[derive(Args)]
pub struct BakeArgs {
    /// Recipe to bake
    pub recipe: String,
    /// Check stock and show the deductions without changing anything
    #[arg(long)]
    pub dry_run: bool,
}

pub fn run(args: BakeArgs) -> CmdResult {
    let (bakery, _) = open_bakery()?;
    if args.dry_run {
        let plan = bakery.plan_bake(&args.recipe)?;
        print_json(&plan)?;
        if let Some(problem) = plan.first_problem() {
            return Err(problem.clone().into_error().into());
        }
        return Ok(());
    }
    let entry = bakery.bake(&args.recipe)?;
    print_json(&entry)
}
