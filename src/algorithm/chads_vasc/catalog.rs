//! Disease catalog for the CHA2DS2-VASc score
//!
//! The catalog holds the diseases that count towards each score category and
//! the two marker groups used by the simulation: atrial fibrillation (the
//! eligibility trigger) and stroke (the outcome). A catalog is an immutable,
//! versioned value; share it with `Arc` and inject it where it is needed.
//!
//! Diseases are coded as (specialty, DBC diagnosis code). Specialty codes:
//!
//! | Code | Specialty |
//! |------|-----------|
//! | ANE | Anaesthesiology |
//! | CAR | Cardiology |
//! | CHI | Surgery |
//! | DIE | Dietetics |
//! | FYS | Physiotherapy |
//! | GER | Geriatrics |
//! | INT | Internal medicine |
//! | LON | Pulmonology |
//! | MDL | Gastroenterology |
//! | NEU | Neurology |
//! | OGK | Elderly care |
//! | ORT | Orthopaedics |
//! | REV | Rehabilitation |

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CohortError, Result};
use crate::models::{Disease, DiseaseGroup};

/// CHA2DS2-VASc score categories backed by diagnoses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ScoreCategory {
    /// Congestive heart failure (C)
    CongestiveHeartFailure,
    /// Hypertension (H)
    Hypertension,
    /// Diabetes mellitus (D)
    Diabetes,
    /// Prior stroke or TIA (S2)
    StrokeTia,
    /// Vascular disease (V)
    VascularDisease,
}

impl ScoreCategory {
    /// Get the score letter for this category
    #[must_use]
    pub const fn letter(self) -> &'static str {
        match self {
            Self::CongestiveHeartFailure => "C",
            Self::Hypertension => "H",
            Self::Diabetes => "D",
            Self::StrokeTia => "S",
            Self::VascularDisease => "V",
        }
    }

    /// Get the display name for this category
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::CongestiveHeartFailure => "Congestive Heart Failure",
            Self::Hypertension => "Hypertension",
            Self::Diabetes => "Diabetes Mellitus",
            Self::StrokeTia => "Stroke / TIA",
            Self::VascularDisease => "Vascular Disease",
        }
    }

    /// Weight of the category in the standard score
    #[must_use]
    pub const fn default_weight(self) -> u32 {
        match self {
            Self::StrokeTia => 2,
            _ => 1,
        }
    }

    /// All categories in score order (C, H, D, S, V)
    #[must_use]
    pub const fn all_categories() -> [Self; 5] {
        [
            Self::CongestiveHeartFailure,
            Self::Hypertension,
            Self::Diabetes,
            Self::StrokeTia,
            Self::VascularDisease,
        ]
    }
}

impl fmt::Display for ScoreCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// A score category with its weight and member diseases
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightedGroup {
    /// Score category
    pub category: ScoreCategory,
    /// Points added when any member disease is present
    pub weight: u32,
    /// Member diseases
    pub group: DiseaseGroup,
}

/// Immutable reference data for scoring and eligibility
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiseaseCatalog {
    /// Version label of the catalog data
    pub version: String,
    score_groups: Vec<WeightedGroup>,
    atrial_fibrillation: DiseaseGroup,
    stroke: DiseaseGroup,
}

impl DiseaseCatalog {
    /// Create a catalog from its parts
    ///
    /// Fails when a score category appears more than once.
    pub fn new(
        version: impl Into<String>,
        score_groups: Vec<WeightedGroup>,
        atrial_fibrillation: DiseaseGroup,
        stroke: DiseaseGroup,
    ) -> Result<Self> {
        for (i, group) in score_groups.iter().enumerate() {
            if score_groups[..i].iter().any(|g| g.category == group.category) {
                return Err(CohortError::invalid_config(format!(
                    "score category {} appears more than once in the catalog",
                    group.category
                )));
            }
        }

        Ok(Self {
            version: version.into(),
            score_groups,
            atrial_fibrillation,
            stroke,
        })
    }

    /// The standard catalog selected for the AF study
    ///
    /// The stroke marker group is currently the same set of diseases as the
    /// stroke/TIA score category.
    #[must_use]
    pub fn standard() -> Self {
        let score_groups = ScoreCategory::all_categories()
            .into_iter()
            .map(|category| WeightedGroup {
                category,
                weight: category.default_weight(),
                group: DiseaseGroup::new(category.letter(), table_diseases(table_for(category))),
            })
            .collect();

        Self {
            version: "standard-1".to_string(),
            score_groups,
            atrial_fibrillation: DiseaseGroup::new(
                "atrial fibrillation",
                ATRIAL_FIBRILLATION
                    .iter()
                    .map(|(specialty, code)| Disease::new(*specialty, *code))
                    .collect(),
            ),
            stroke: DiseaseGroup::new("stroke", table_diseases(STROKE_TIA)),
        }
    }

    /// Return a copy with a different weight for one category
    #[must_use]
    pub fn with_weight(mut self, category: ScoreCategory, weight: u32) -> Self {
        for group in &mut self.score_groups {
            if group.category == category {
                group.weight = weight;
            }
        }
        self
    }

    /// Return a copy with a different version label
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// The weighted score groups in score order
    #[must_use]
    pub fn score_groups(&self) -> &[WeightedGroup] {
        &self.score_groups
    }

    /// The group of one score category
    #[must_use]
    pub fn score_group(&self, category: ScoreCategory) -> Option<&WeightedGroup> {
        self.score_groups.iter().find(|g| g.category == category)
    }

    /// Whether a disease counts towards any score category
    #[must_use]
    pub fn is_scored(&self, disease: &Disease) -> bool {
        self.score_groups.iter().any(|g| g.group.contains(disease))
    }

    /// The atrial fibrillation marker group
    #[must_use]
    pub const fn atrial_fibrillation(&self) -> &DiseaseGroup {
        &self.atrial_fibrillation
    }

    /// The stroke marker group
    #[must_use]
    pub const fn stroke(&self) -> &DiseaseGroup {
        &self.stroke
    }

    /// Every scored disease, in score order
    pub fn scored_diseases(&self) -> impl Iterator<Item = &Disease> {
        self.score_groups.iter().flat_map(|g| g.group.iter())
    }
}

impl Default for DiseaseCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

fn table_for(category: ScoreCategory) -> &'static [(&'static str, &'static str, &'static str)] {
    match category {
        ScoreCategory::CongestiveHeartFailure => HEART_FAILURE,
        ScoreCategory::Hypertension => HYPERTENSION,
        ScoreCategory::Diabetes => DIABETES,
        ScoreCategory::StrokeTia => STROKE_TIA,
        ScoreCategory::VascularDisease => VASCULAR_DISEASE,
    }
}

fn table_diseases(table: &[(&str, &str, &str)]) -> Vec<Disease> {
    table
        .iter()
        .map(|(specialty, code, description)| {
            Disease::new(*specialty, *code).with_description(*description)
        })
        .collect()
}

// Diagnoses selected by a cardiologist from all diagnoses present in the AF
// population. Descriptions are the Dutch DBC descriptions.

const HEART_FAILURE: &[(&str, &str, &str)] = &[
    ("CAR", "21", "aanwijzingen beperkt hartfalen"),
    ("CAR", "22", "acuut hartfalen"),
    ("CAR", "25", "hartfalen bij kleplijden"),
    ("CAR", "26", "hartfalen bij CMP"),
    ("CAR", "27", "chronisch hartfalen"),
    ("CAR", "301", "Acuut hartfalen"),
    ("CAR", "302", "Chronisch hartfalen"),
    ("DIE", "26", "Hartfalen"),
    ("GER", "262", "Decompensatio cordis"),
    ("INT", "107", "decompensatio cordis"),
];

const HYPERTENSION: &[(&str, &str, &str)] = &[
    ("CAR", "72", "hypertensie"),
    ("CAR", "902", "hypertensie"),
    ("DIE", "27", "Hypertensie"),
    ("INT", "311", "Hypertensie"),
    ("MDL", "901", "Hypertensie"),
];

const DIABETES: &[(&str, &str, &str)] = &[
    ("CHI", "432", "diabetische voet(diabetes nno)"),
    ("DIE", "54", "Diabetes type 1"),
    ("DIE", "55", "Diabetes type  2"),
    ("GER", "222", "Diabetes Mellitus"),
    ("INT", "221", "DM znd secundaire complicaties"),
    ("INT", "222", "DM met secundaire complicaties"),
    ("INT", "223", "DM chronisch pomptherapie"),
    ("MDL", "902", "Diabetes mellitus"),
    ("ORT", "2065", "Diabetische voet"),
];

const STROKE_TIA: &[(&str, &str, &str)] = &[
    ("GER", "263", "CVA / TIA"),
    ("INT", "121", "cerebrovasculair acc/TIA"),
    ("NEU", "1111", "onbloedige beroerte"),
    ("NEU", "1112", "TIA (incl amaurosis fugax)"),
    ("NEU", "1199", "overige cerebrovasc aand"),
    ("NEU", "9927", "Geen neur, werkdiag TIA"),
    ("OGK", "101", "CVA"),
    ("REV", "313", "CVA"),
    ("REV", "C31", "CVA klasse 1"),
    ("REV", "C32", "CVA klasse 2"),
    ("REV", "C33", "CVA klasse 3"),
    ("REV", "C34", "CVA klasse 4"),
    ("REV", "C36", "CVA klasse 6"),
];

const VASCULAR_DISEASE: &[(&str, &str, &str)] = &[
    ("ANE", "110", "Ischaem pijn a/d extremiteiten"),
    ("CAR", "3", "AP, geen ischemie aangetoond"),
    ("CAR", "4", "AP, ischemie aangetoond"),
    ("CAR", "5", "ischemie znd AP (stille isch)"),
    ("CAR", "7", "onstabiele / progressieve AP"),
    ("CAR", "9", "acuut MI (q/non-q) voorwand"),
    ("CAR", "11", "acuut MI (q/non-q) elders"),
    ("CAR", "13", "follow up na myocardinfarct"),
    ("CAR", "15", "follow up na  PTCA en/of CABG"),
    ("CAR", "202", "angina pectoris, stabiel"),
    ("CAR", "203", "angina pectoris, onstabiel"),
    ("CAR", "204", "ST elevatie hartinfarct"),
    ("CAR", "205", "non ST elevatie hartinfarct"),
    ("CAR", "601", "Arteriele vaatafw / stenose"),
    ("CAR", "801", "Follow-up na acuut cor syndr"),
    ("CAR", "802", "followup na PTCA e/o CABG/abl"),
    ("CAR", "808", "f-up na vaatoper(arte/ven)"),
    ("CHI", "402", "Carotispathologie"),
    ("CHI", "403", "Aneurysma aorta thor, ruptuur"),
    ("CHI", "405", "Aneurysma aorta iliacaal"),
    ("CHI", "406", "Aneurysma aorta abd, ruptuur"),
    ("CHI", "408", "nierarteriestenose"),
    ("CHI", "409", "Vaat afw abdominaal / bekken"),
    ("CHI", "410", "Vaatletsel bovenste extremit"),
    ("CHI", "412", "P.A.O.D. arm"),
    ("CHI", "416", "Aneurysma onderste extremiteit"),
    ("CHI", "418", "P.A.O.D. 2, claudicatio interm"),
    ("CHI", "419", "P.A.O.D. 3, rustpijn"),
    ("CHI", "420", "P.A.O.D. 4, gangreen"),
    ("FYS", "2048", "Hart-, Vaat-, Lymfevataandoeningen - alg. vaatlijd"),
    ("FYS", "2540", "Hart-, Vaat-, Lymfevataandoeningen - Hartaandoenin"),
    ("FYS", "2541", "harftinfarct, myocard-infarct (AMI)"),
    ("FYS", "2544", "Hart-, Vaat-, Lymfevataandoeningen - status na har"),
    ("FYS", "2548", "Hart-, Vaat-, Lymfevataandoeningen - alg. vaatlijd"),
    ("FYS", "6048", "Algemeen vaatlijden, circulatiestoornissen"),
    ("FYS", "6948", "Hart-, Vaat-, Lymfevataandoeningen - alg. vaatlijd"),
    ("FYS", "7148", "Hart-, Vaat-, Lymfevataandoeningen - alg. vaatlijd"),
    ("FYS", "7948", "Hart-, Vaat-, Lymfevataandoeningen - alg. vaatlijd"),
    ("FYS", "9048", "Hart-, Vaat-, Lymfevataandoeningen - alg. vaatlijd"),
    ("FYS", "9248", "Hart-, Vaat-, Lymfevataandoeningen - alg. vaatlijd"),
    ("FYS", "9346", "Hart-, Vaat-, Lymfevataandoeningen - Lymfevataando"),
    ("FYS", "9348", "Hart-, Vaat-, Lymfevataandoeningen - alg. vaatlijd"),
    ("GER", "261", "Aandoeningen hartvaatstelsel"),
    ("INT", "101", "sympt isch hartz, niet DBC-102"),
    ("INT", "102", "Instabiele AP, myocardinfarct"),
    ("INT", "122", "Arteriële trombose en embolie"),
    ("INT", "124", "atheroscl extr/perif vaatlijd"),
    ("INT", "129", "Aneurysma en ov arter vaat"),
    ("LON", "1102", "Pijn op de borst"),
    ("REV", "F21", "Hart/bloedvaten 1"),
    ("REV", "F22", "Hart/bloedvaten 2"),
    ("REV", "F23", "Hart/bloedvaten 3"),
    ("REV", "F24", "Hart/bloedvaten 4"),
];

const ATRIAL_FIBRILLATION: &[(&str, &str)] = &[("CAR", "401"), ("INT", "106")];
