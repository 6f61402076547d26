use crate::error::{CliError, Result};
use assyst::core::filters::tolerance::TolerancePreset;
use assyst::core::filters::{
    AspectFilter, DistanceFilter, EnergyFilter, Filter, ForceFilter, VolumeFilter,
};
use assyst::core::formulas::Formulas;
use assyst::core::perturbations::stretch::DEFAULT_MINIMUM_STRAIN;
use assyst::core::perturbations::{
    ElementScaledRattle, Perturbation, RandomChoice, Rattle, RngHandle, Series, Stretch,
};
use assyst::engine::config::{self as core_config, PerturbationConfigBuilder};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialRattle {
    sigma: f64,
    #[serde(default)]
    create_supercells: bool,
    seed: Option<u64>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialScaledRattle {
    sigma: f64,
    reference: BTreeMap<String, f64>,
    #[serde(default)]
    create_supercells: bool,
    seed: Option<u64>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialStretch {
    hydro: f64,
    shear: f64,
    minimum_strain: Option<f64>,
    seed: Option<u64>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
struct PartialSeries {
    members: Vec<PartialPerturbation>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
struct PartialRandomChoice {
    a: Box<PartialPerturbation>,
    b: Box<PartialPerturbation>,
    chance: f64,
    seed: Option<u64>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", tag = "type")]
enum PartialPerturbation {
    Rattle(PartialRattle),
    ElementScaledRattle(PartialScaledRattle),
    Stretch(PartialStretch),
    Series(PartialSeries),
    RandomChoice(PartialRandomChoice),
}

/// Hands out seeds to perturbations that do not set their own.
struct SeedSequence(Option<u64>);

impl SeedSequence {
    fn next(&mut self, explicit: Option<u64>) -> Option<u64> {
        let derived = self.0;
        self.0 = self.0.map(|s| s.wrapping_add(1));
        explicit.or(derived)
    }
}

fn reseed(seed: Option<u64>, rng: &mut RngHandle) {
    if let Some(seed) = seed {
        *rng = RngHandle::from_seed(seed);
    }
}

impl PartialPerturbation {
    fn build(self, seeds: &mut SeedSequence) -> Result<Perturbation> {
        Ok(match self {
            Self::Rattle(p) => {
                let mut rattle = Rattle::new(p.sigma).create_supercells(p.create_supercells);
                reseed(seeds.next(p.seed), &mut rattle.rng);
                rattle.into()
            }
            Self::ElementScaledRattle(p) => {
                let mut rattle = ElementScaledRattle::new(p.sigma, p.reference)
                    .map_err(|e| CliError::Config(format!("element-scaled-rattle: {e}")))?
                    .create_supercells(p.create_supercells);
                reseed(seeds.next(p.seed), &mut rattle.rng);
                rattle.into()
            }
            Self::Stretch(p) => {
                let mut stretch = Stretch::new(p.hydro, p.shear)
                    .minimum_strain(p.minimum_strain.unwrap_or(DEFAULT_MINIMUM_STRAIN));
                reseed(seeds.next(p.seed), &mut stretch.rng);
                stretch.into()
            }
            Self::Series(p) => {
                if p.members.is_empty() {
                    return Err(CliError::Config(
                        "series: at least one member is required.".to_string(),
                    ));
                }
                Series::new(
                    p.members
                        .into_iter()
                        .map(|m| m.build(seeds))
                        .collect::<Result<_>>()?,
                )
                .into()
            }
            Self::RandomChoice(p) => {
                if !(0.0..=1.0).contains(&p.chance) {
                    return Err(CliError::Config(format!(
                        "random-choice: chance must lie in [0, 1], got {}",
                        p.chance
                    )));
                }
                let seed = seeds.next(p.seed);
                let a = p.a.build(seeds)?;
                let b = p.b.build(seeds)?;
                let mut choice = RandomChoice::new(a, b, p.chance);
                reseed(seed, &mut choice.rng);
                choice.into()
            }
        })
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
struct PartialDistance {
    preset: Option<TolerancePreset>,
    radii: Option<BTreeMap<String, f64>>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialAspect {
    maximum_aspect_ratio: Option<f64>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialVolume {
    maximum_volume_per_atom: f64,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialEnergy {
    min_energy: Option<f64>,
    max_energy: Option<f64>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialForce {
    max_force: f64,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", tag = "type")]
enum PartialFilter {
    Distance(PartialDistance),
    Aspect(PartialAspect),
    Volume(PartialVolume),
    Energy(PartialEnergy),
    Force(PartialForce),
}

impl TryFrom<PartialFilter> for Filter {
    type Error = CliError;

    fn try_from(p: PartialFilter) -> Result<Self> {
        Ok(match p {
            PartialFilter::Distance(d) => match (d.preset, d.radii) {
                (Some(_), Some(_)) => {
                    return Err(CliError::Config(
                        "distance filter takes either `preset` or `radii`, not both".to_string(),
                    ));
                }
                (_, Some(radii)) => DistanceFilter::explicit(radii).into(),
                (Some(preset), None) => DistanceFilter::preset(preset).into(),
                (None, None) => DistanceFilter::default().into(),
            },
            PartialFilter::Aspect(a) => match a.maximum_aspect_ratio {
                Some(ratio) => AspectFilter::new(ratio).into(),
                None => AspectFilter::default().into(),
            },
            PartialFilter::Volume(v) => VolumeFilter::new(v.maximum_volume_per_atom).into(),
            PartialFilter::Energy(e) => EnergyFilter::new(e.min_energy, e.max_energy).into(),
            PartialFilter::Force(f) => ForceFilter::new(f.max_force).into(),
        })
    }
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialFormulas {
    elements: Vec<String>,
    start: Option<u32>,
    stop: Option<u32>,
    step: Option<usize>,
    min_atoms: Option<u32>,
    max_atoms: Option<u32>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct PartialPipelineConfig {
    retries: Option<usize>,
    seed: Option<u64>,
    #[serde(default)]
    perturbations: Vec<PartialPerturbation>,
    #[serde(default)]
    prefilters: Vec<PartialFilter>,
    #[serde(default)]
    filters: Vec<PartialFilter>,
    formulas: Option<PartialFormulas>,
}

impl FromStr for PartialPipelineConfig {
    type Err = toml::de::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        toml::from_str(s)
    }
}

impl PartialPipelineConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        content.parse().map_err(|e: toml::de::Error| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    /// Builds the perturbation pipeline; `--retries` and `--seed` take precedence over
    /// the file.
    pub fn into_perturbation_config(
        mut self,
        retries: Option<usize>,
        seed: Option<u64>,
        set_values: &[String],
    ) -> Result<core_config::PerturbationConfig> {
        self.apply_set_values(set_values)?;
        let mut seeds = SeedSequence(seed.or(self.seed));

        let perturbations = self
            .perturbations
            .into_iter()
            .map(|p| p.build(&mut seeds))
            .collect::<Result<Vec<_>>>()?;

        PerturbationConfigBuilder::new()
            .perturbations(perturbations)
            .prefilters(convert_filters(self.prefilters)?)
            .filters(convert_filters(self.filters)?)
            .retries(
                retries
                    .or(self.retries)
                    .unwrap_or(core_config::DEFAULT_RETRIES),
            )
            .build()
            .map_err(|e| CliError::Config(e.to_string()))
    }

    pub fn into_filters(self) -> Result<Vec<Filter>> {
        convert_filters(self.filters)
    }

    pub fn into_formulas(mut self, set_values: &[String]) -> Result<Formulas> {
        self.apply_set_values(set_values)?;
        let formulas = self.formulas.ok_or_else(|| {
            CliError::Config("`formulas` section is required.".to_string())
        })?;
        if formulas.elements.is_empty() {
            return Err(CliError::Config(
                "`formulas.elements` must not be empty.".to_string(),
            ));
        }
        let stop = formulas.stop.ok_or_else(|| {
            CliError::Config("`formulas.stop` is required.".to_string())
        })?;
        let elements: Vec<&str> = formulas.elements.iter().map(String::as_str).collect();
        let product = Formulas::range_product_step(
            &elements,
            formulas.start.unwrap_or(0)..stop,
            formulas.step.unwrap_or(1),
        )
        .map_err(|e| CliError::Config(e.to_string()))?;
        Ok(product.trim(
            formulas.min_atoms.unwrap_or(core_config::DEFAULT_MIN_ATOMS),
            formulas.max_atoms,
        ))
    }

    fn apply_set_values(&mut self, set_values: &[String]) -> Result<()> {
        for kv_pair in set_values {
            let Some((key, value_str)) = kv_pair.split_once('=') else {
                return Err(CliError::Config(format!(
                    "Invalid --set format: '{}'. Expected KEY=VALUE.",
                    kv_pair
                )));
            };
            match key {
                "retries" => self.retries = Some(parse_value(key, value_str)?),
                "seed" => self.seed = Some(parse_value(key, value_str)?),
                "formulas.start" => {
                    self.formulas.get_or_insert_with(Default::default).start =
                        Some(parse_value(key, value_str)?)
                }
                "formulas.stop" => {
                    self.formulas.get_or_insert_with(Default::default).stop =
                        Some(parse_value(key, value_str)?)
                }
                "formulas.step" => {
                    self.formulas.get_or_insert_with(Default::default).step =
                        Some(parse_value(key, value_str)?)
                }
                "formulas.min-atoms" => {
                    self.formulas.get_or_insert_with(Default::default).min_atoms =
                        Some(parse_value(key, value_str)?)
                }
                "formulas.max-atoms" => {
                    self.formulas.get_or_insert_with(Default::default).max_atoms =
                        Some(parse_value(key, value_str)?)
                }
                _ => {
                    return Err(CliError::Config(format!(
                        "Unsupported configuration key for --set: '{}'",
                        key
                    )));
                }
            }
        }
        Ok(())
    }
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| CliError::Config(format!("Invalid value for {}: {}", key, value)))
}

fn convert_filters(partials: Vec<PartialFilter>) -> Result<Vec<Filter>> {
    partials.into_iter().map(Filter::try_from).collect()
}
