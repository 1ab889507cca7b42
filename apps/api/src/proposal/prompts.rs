// Prompt templates for proposal generation and announcement analysis.
// Placeholders are filled by `builder::render`; no other braces may appear here.

/// Full proposal. Replace: {announcement_text}, {company_info}
pub const PROPOSAL_PROMPT_TEMPLATE: &str = "아래의 정부지원과제 공고문과 회사 정보를 바탕으로 약 30페이지 분량의 상세한 사업계획서를 작성해주세요.

공고문:
{announcement_text}

회사 정보:
{company_info}

다음과 같은 구조로 사업계획서를 작성해주세요:

1. 사업 개요
2. 기업 현황
3. 사업 목표 및 내용
4. 추진 전략 및 방법
5. 사업 수행 체계
6. 기대효과
7. 소요예산
8. 향후 계획

각 섹션을 상세하게 작성하되, 공고문의 요구사항과 회사의 강점이 잘 부합되도록 작성해주세요.
특히 다음 사항들을 중점적으로 반영해주세요:
1. 공고문의 지원자격과 회사의 적격성
2. 공고문의 우대사항과 회사의 장점
3. 공고문의 평가기준과 회사의 강점
4. 지원금액 한도와 예산 계획의 적절성";

/// Requirement analysis. Replace: {announcement_text}
pub const ANALYSIS_PROMPT_TEMPLATE: &str = "다음 공고문을 분석하여 핵심 요구사항들을 추출해주세요:
1. 지원자격 요건
2. 우대사항
3. 평가 기준
4. 지원금액 한도
5. 주의사항

공고문:
{announcement_text}
";

/// Proposal outline headings, in order.
pub const PROPOSAL_SECTIONS: [&str; 8] = [
    "사업 개요",
    "기업 현황",
    "사업 목표 및 내용",
    "추진 전략 및 방법",
    "사업 수행 체계",
    "기대효과",
    "소요예산",
    "향후 계획",
];

/// Analysis categories, in order.
pub const ANALYSIS_CATEGORIES: [&str; 5] = [
    "지원자격 요건",
    "우대사항",
    "평가 기준",
    "지원금액 한도",
    "주의사항",
];
