use serde::{Deserialize, Serialize};
use strum::EnumIter;

use crate::steps::Step;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, EnumIter)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Ar,
}

impl Language {
    pub fn toggled(self) -> Self {
        match self {
            Language::En => Language::Ar,
            Language::Ar => Language::En,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Language::En => "EN",
            Language::Ar => "AR",
        }
    }

    pub fn is_rtl(self) -> bool {
        self == Language::Ar
    }

    pub fn labels(self) -> &'static Labels {
        match self {
            Language::En => &EN,
            Language::Ar => &AR,
        }
    }
}

pub struct Labels {
    pub title: &'static str,
    pub materials: &'static str,
    pub labor: &'static str,
    pub profit_tax: &'static str,
    pub summary: &'static str,
    pub add_material: &'static str,
    pub material_name: &'static str,
    pub qty: &'static str,
    pub unit_price: &'static str,
    pub hourly_rate: &'static str,
    pub hours: &'static str,
    pub fixed_cost: &'static str,
    pub margin: &'static str,
    pub tax: &'static str,
    pub total_cost: &'static str,
    pub selling_price: &'static str,
    pub reset: &'static str,
    pub reset_confirm: &'static str,
    pub next: &'static str,
    pub prev: &'static str,
    pub ai_help: &'static str,
    pub ai_placeholder: &'static str,
    pub ai_loading: &'static str,
    pub add_to_project: &'static str,
    pub export_pdf: &'static str,
    pub export_csv: &'static str,
    pub save_project: &'static str,
    pub saved_projects: &'static str,
    pub project_name: &'static str,
    pub load: &'static str,
    pub delete: &'static str,
    pub save: &'static str,
    pub cancel: &'static str,
    pub confirm: &'static str,
    pub no_projects: &'static str,
    pub no_materials: &'static str,
    pub overwrite: &'static str,
    pub how_to_use: &'static str,
    pub description: &'static str,
    pub quotes: &'static [&'static str],
    instructions: [&'static str; 4],
}

impl Labels {
    pub fn step_title(&self, step: Step) -> &'static str {
        match step {
            Step::Materials => self.materials,
            Step::Labor => self.labor,
            Step::Margin => self.profit_tax,
            Step::Summary => self.summary,
        }
    }

    pub fn instructions(&self, step: Step) -> &'static str {
        self.instructions[step.index()]
    }

    /// Picks a quote for `step`; `seed` rotates the choice between visits.
    pub fn quote(&self, step: Step, seed: u64) -> &'static str {
        let n = self.quotes.len() as u64;
        let idx = seed.wrapping_add(step.index() as u64) % n;
        self.quotes[idx as usize]
    }
}

static EN: Labels = Labels {
    title: "ValoraPricing",
    materials: "Materials",
    labor: "Labor",
    profit_tax: "Profit & Tax",
    summary: "Summary",
    add_material: "Add material",
    material_name: "Material name",
    qty: "Qty",
    unit_price: "Unit price",
    hourly_rate: "Hourly rate",
    hours: "Hours",
    fixed_cost: "Fixed labor cost",
    margin: "Profit margin",
    tax: "Tax rate",
    total_cost: "Total cost",
    selling_price: "Final selling price",
    reset: "Reset",
    reset_confirm: "Reset all data?",
    next: "Next",
    prev: "Back",
    ai_help: "AI estimate",
    ai_placeholder: "Describe your project, e.g. repaint a 3-room apartment",
    ai_loading: "Estimating…",
    add_to_project: "Add to project",
    export_pdf: "Export PDF",
    export_csv: "Export spreadsheet",
    save_project: "Save project",
    saved_projects: "Saved projects",
    project_name: "Project name",
    load: "Load",
    delete: "Delete",
    save: "Save",
    cancel: "Cancel",
    confirm: "Confirm",
    no_projects: "No saved projects yet.",
    no_materials: "Your materials list will appear here.",
    overwrite: "A project with this name exists. Overwrite it?",
    how_to_use: "How to use",
    description: "ValoraPricing helps entrepreneurs, contractors and freelancers \
        calculate project costs accurately and set profitable selling prices.",
    quotes: &[
        "Price for the value you deliver, not the hours you spend.",
        "Know your costs and your confidence follows.",
        "A fair price is one you can explain line by line.",
        "Small margins add up; so do small leaks.",
        "Every estimate is a promise. Make it one you can keep.",
    ],
    instructions: [
        "List every material with its quantity and unit price, or ask the AI for a starting list.",
        "Enter your hourly rate, the hours the job takes, and any fixed labor cost.",
        "Set the profit margin you need and the tax rate that applies.",
        "Review the final price, export it, or save the project for later.",
    ],
};

static AR: Labels = Labels {
    title: "ValoraPricing",
    materials: "المواد",
    labor: "العمالة",
    profit_tax: "الربح والضريبة",
    summary: "الملخص",
    add_material: "إضافة مادة",
    material_name: "اسم المادة",
    qty: "الكمية",
    unit_price: "سعر الوحدة",
    hourly_rate: "أجر الساعة",
    hours: "الساعات",
    fixed_cost: "تكلفة عمالة ثابتة",
    margin: "هامش الربح",
    tax: "نسبة الضريبة",
    total_cost: "التكلفة الإجمالية",
    selling_price: "سعر البيع النهائي",
    reset: "مسح",
    reset_confirm: "هل تريد مسح جميع البيانات؟",
    next: "التالي",
    prev: "السابق",
    ai_help: "تقدير بالذكاء الاصطناعي",
    ai_placeholder: "صف مشروعك، مثلاً: دهان شقة من ثلاث غرف",
    ai_loading: "جارٍ التقدير…",
    add_to_project: "إضافة للمشروع",
    export_pdf: "تصدير PDF",
    export_csv: "تصدير جدول",
    save_project: "حفظ المشروع",
    saved_projects: "المشاريع المحفوظة",
    project_name: "اسم المشروع",
    load: "فتح",
    delete: "حذف",
    save: "حفظ",
    cancel: "إلغاء",
    confirm: "تأكيد",
    no_projects: "لا توجد مشاريع محفوظة بعد.",
    no_materials: "ستظهر قائمة المواد هنا.",
    overwrite: "يوجد مشروع بهذا الاسم. هل تريد استبداله؟",
    how_to_use: "طريقة الاستخدام",
    description: "ValoraPricing أداة احترافية تساعد رواد الأعمال والمقاولين \
        والمستقلين على حساب تكاليف مشاريعهم بدقة وتحديد أسعار بيع مربحة.",
    quotes: &[
        "سعّر القيمة التي تقدمها، لا الساعات التي تقضيها.",
        "اعرف تكاليفك تأتيك الثقة.",
        "السعر العادل هو الذي تستطيع شرحه بندًا بندًا.",
        "كل تقدير وعد، فاجعله وعدًا تستطيع الوفاء به.",
    ],
    instructions: [
        "أدخل كل مادة مع كميتها وسعر الوحدة، أو اطلب قائمة مبدئية من الذكاء الاصطناعي.",
        "أدخل أجر الساعة وعدد ساعات العمل وأي تكلفة عمالة ثابتة.",
        "حدد هامش الربح المطلوب ونسبة الضريبة المطبقة.",
        "راجع السعر النهائي، صدّره، أو احفظ المشروع لاحقًا.",
    ],
};

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn every_language_has_instructions_and_quotes() {
        for lang in Language::iter() {
            let labels = lang.labels();
            assert!(!labels.quotes.is_empty());
            for step in Step::iter() {
                assert!(!labels.instructions(step).is_empty());
                assert!(labels.quotes.contains(&labels.quote(step, 42)));
            }
        }
    }

    #[test]
    fn toggle_flips_language() {
        assert_eq!(Language::En.toggled(), Language::Ar);
        assert!(Language::En.toggled().is_rtl());
        assert_eq!(Language::Ar.toggled().code(), "EN");
    }
}
