use crate::cli::FormulasArgs;
use crate::config::PartialPipelineConfig;
use crate::error::Result;
use assyst::core::formulas::{self, Formulas};

pub fn run(args: FormulasArgs) -> Result<()> {
    let formulas =
        PartialPipelineConfig::from_file(&args.config)?.into_formulas(&args.set_values)?;
    print!("{}", render(&formulas));
    Ok(())
}

fn render(formulas: &Formulas) -> String {
    let mut out = String::new();
    for stoichiometry in formulas {
        out.push_str(&format!(
            "{:<16} {:>4}\n",
            formulas::label(stoichiometry),
            formulas::total_atoms(stoichiometry)
        ));
    }
    out.push_str(&format!("{} formulas\n", formulas.len()));
    out
}
