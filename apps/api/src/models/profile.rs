use chrono::NaiveDate;
use serde::Serialize;

/// Company details submitted with a proposal request. Built once per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanyProfile {
    pub company_name: String,
    pub business_number: String,
    pub ceo_name: String,
    pub establishment_date: NaiveDate,
    pub employee_count: u32,
    /// Millions of KRW.
    pub annual_revenue: u64,
    pub main_business: String,
    /// Optional on the form; may be empty.
    pub company_address: String,
}

// Field order here is the rendered order.
#[derive(Serialize)]
struct PromptRecord<'a> {
    #[serde(rename = "회사명")]
    company_name: &'a str,
    #[serde(rename = "사업자등록번호")]
    business_number: &'a str,
    #[serde(rename = "대표자명")]
    ceo_name: &'a str,
    #[serde(rename = "설립일자")]
    establishment_date: String,
    #[serde(rename = "직원수")]
    employee_count: u32,
    #[serde(rename = "연간매출액")]
    annual_revenue: String,
    #[serde(rename = "주요사업내용")]
    main_business: &'a str,
    #[serde(rename = "회사주소")]
    company_address: &'a str,
}

impl CompanyProfile {
    /// Pretty-printed JSON record (two-space indent, Hangul kept verbatim) embedded
    /// in the proposal prompt.
    pub fn to_prompt_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&PromptRecord {
            company_name: &self.company_name,
            business_number: &self.business_number,
            ceo_name: &self.ceo_name,
            establishment_date: self.establishment_date.format("%Y-%m-%d").to_string(),
            employee_count: self.employee_count,
            annual_revenue: format!("{}백만원", self.annual_revenue),
            main_business: &self.main_business,
            company_address: &self.company_address,
        })
    }
}
