// Puzzle templates grouped by category.
//
// The built-in table can be replaced at startup with a JSON file of the form
// `{"category": ["template with {placeholder}", ...]}`.

use std::collections::BTreeMap;
use std::path::Path;

use crate::error::ConfigError;

const BUILTIN: &[(&str, &[&str])] = &[
    (
        "رياضة",
        &[
            "أنا {role} في فريق {sport}، وفريقي يلعب اليوم في {city}. إذا سجّل فريقي {number} أهداف في الشوط الأول ولم يسجل شيئًا في الثاني، كم هدفًا سجّلنا في المباراة؟",
            "في بطولة {sport} شارك {number} فرق، وكل فريق لعب مباراة واحدة مع كل فريق آخر. كم مباراة لُعبت؟",
            "لاعب {sport} من {country} يرتدي القميص {color}. زميله {role} يقف خلفه دائمًا. من يقف أمام {role}؟",
            "ما الرياضة التي يستخدم فيها {role} يديه فقط بينما يُمنع ذلك على بقية الفريق؟ تلميح: الفرق تلعب في {city}.",
        ],
    ),
    (
        "تاريخ",
        &[
            "في {era} عاش {profession} اسمه {name}، وكان يصنع {object} كل يوم. بعد {number} أيام، كم {object} صنع؟",
            "من هو العالم الذي عاش في {era} وكتب عن البصريات؟ تلميح: ليس {scientist}.",
            "إذا سافر تاجر من {city} إلى {country} في {era} ومعه {number} جمال، وباع نصفها، كم بقي معه؟",
        ],
    ),
    (
        "علوم",
        &[
            "أنا عنصر أدخل في صنع {object}، ورمزي الكيميائي يبدأ بحرف من اسم {element}. من أنا؟",
            "كوكب {planet} يدور حول الشمس. إذا كان {name} يزن {number} كيلوغرامات على الأرض، هل يزيد وزنه أم يقل على {planet}؟",
            "اكتشف {scientist} شيئًا مهمًا عن {element}. ما الحالة التي يكون عليها {element} في درجة حرارة الغرفة؟",
        ],
    ),
    (
        "جغرافيا",
        &[
            "أنا مدينة اسمها {city}، وأقع في دولة مجاورة لـ{country}. ما الدولة التي أنتمي إليها؟",
            "في علم دولة {country} يوجد اللون {color}. اذكر دولة أخرى يحتوي علمها على اللون نفسه.",
            "سافر {name} من {city} شرقًا لمدة {number} ساعات بالطائرة. في أي قارة قد يهبط؟",
        ],
    ),
    (
        "ألغاز",
        &[
            "لي {number} أرجل في الصباح ولا أرجل لي في المساء، وأعيش مع {animal}. ما أنا؟",
            "شيء يشبه {object}، كلما أخذت منه كبر. ما هو؟",
            "{name} لديه {number} من {food}، أكل منها كلها إلا ثلاثة. كم بقي معه؟",
            "أنا {animal} أعيش في {country}، أنام في النهار وأصحو في الليل. ما اسمي؟",
        ],
    ),
    (
        "عام",
        &[
            "ما الشيء الذي يملكه {name} ويستخدمه غيره أكثر منه؟",
            "{profession} يملك {number} من {object} ويعطي {name} نصفها. كم بقي معه؟",
            "ما الذي يمشي بلا أرجل ويبكي بلا عيون؟ تلميح: يظهر كثيرًا فوق {city}.",
        ],
    ),
];

/// Category name → templates.
#[derive(Debug, Clone)]
pub struct TemplateLibrary {
    categories: BTreeMap<String, Vec<String>>,
}

impl TemplateLibrary {
    pub fn builtin() -> Self {
        let categories = BUILTIN
            .iter()
            .map(|(name, templates)| {
                (
                    name.to_string(),
                    templates.iter().map(|t| t.to_string()).collect(),
                )
            })
            .collect();
        Self { categories }
    }

    /// Library with no categories; every lookup falls through.
    pub fn empty() -> Self {
        Self {
            categories: BTreeMap::new(),
        }
    }

    pub fn from_json(contents: &str) -> Result<Self, ConfigError> {
        let categories: BTreeMap<String, Vec<String>> = serde_json::from_str(contents)?;
        Ok(Self { categories })
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&contents)
    }

    /// Templates for `category`, or `None` when absent or empty.
    pub fn templates(&self, category: &str) -> Option<&[String]> {
        self.categories
            .get(category)
            .map(Vec::as_slice)
            .filter(|t| !t.is_empty())
    }

    /// Category names that have at least one template, sorted.
    pub fn categories(&self) -> Vec<&str> {
        self.categories
            .iter()
            .filter(|(_, t)| !t.is_empty())
            .map(|(name, _)| name.as_str())
            .collect()
    }
}

impl Default for TemplateLibrary {
    fn default() -> Self {
        Self::builtin()
    }
}
