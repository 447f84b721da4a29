// Prompts for resume-to-profile extraction.

pub const PROFILE_EXTRACT_SYSTEM: &str = "You read resumes for a job-search tool. \
    You return a single JSON object and nothing else. \
    Do NOT use markdown code fences.";

pub const PROFILE_EXTRACT_PROMPT_TEMPLATE: &str = r#"Read the resume below and return a JSON object with these fields:

- name: the candidate's full name
- headline: current job title or professional headline, e.g. "Business Operations Lead"
- skills: 8 to 15 specific professional skills a recruiter would search for
- industry: the main industry or domain, e.g. "fintech", "e-commerce", "SaaS"
- search_terms: 3 to 5 job titles this person would type into a job board

Skills:
- Prefer domain skills ("payment gateway integration", "merchant onboarding",
  "vendor management") and named tools or methods ("Salesforce", "JIRA",
  "REST API", "Agile", "reconciliation").
- Leave out soft skills, spoken languages and generic office software.
- Leave out vague fragments such as "modules" or "api mappings".
- Each skill should plausibly appear in a posting this person would apply to.

Search terms:
- Job titles only, not skills. Good: "Payment Operations Manager". Bad: "lead jobs".

Shape:
{"name": "...", "headline": "...", "skills": ["..."], "industry": "...", "search_terms": ["..."]}

Resume text:
{resume_text}

JSON:"#;
