// Prompts for per-job fit analysis.

pub const ANALYSIS_SYSTEM: &str = "You are an experienced recruiter and career coach. \
    You judge candidate-job fit honestly and return a single JSON object. \
    Do NOT use markdown code fences.";

pub const ANALYSIS_PROMPT_TEMPLATE: &str = r#"Judge how well this candidate fits this job.

Candidate:
Headline: {headline}
Experience years: {experience_years}
Skills: {skills}

Job:
Title: {title}
Company: {company}
Location: {location}
Summary: {summary}

Scoring rules:
1. Experience gap. If the job asks for more than 5 years beyond the candidate's
   experience, fit_score is 20. A 10+ year role for a 5 year candidate is about 30;
   an 8+ year role for a 5 year candidate is about 50.
2. Seniority. If the title contains Senior, Sr., Lead, Director, VP or Principal
   and the candidate has fewer than 8 years, fit_score stays below 40.
3. Scale. 80-100 strong match, 60-79 good match with minor gaps,
   40-59 weak match, 0-39 not a fit.

Return JSON only:
{
  "fit_score": <integer 0-100>,
  "strong_signals": ["specific skills or experience that match"],
  "gaps": ["missing skills or requirements, honest but kind"],
  "salary_estimate": "estimated range for the role, location and company tier",
  "verdict": "one sentence on why to apply or not"
}"#;
