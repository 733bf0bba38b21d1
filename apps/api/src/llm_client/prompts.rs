// Prompt text for resume extraction.
// Every provider receives the same instruction block; only the envelope differs.

/// System message for providers that accept one.
pub const RESUME_PARSER_SYSTEM: &str = "You are a precise resume parser that extracts \
    structured information from resumes and returns it in JSON format. \
    You follow the provided TypeScript interface exactly and ensure all required fields are present.";

pub const RESUME_PARSE_PROMPT: &str = r#"Parse this resume and extract structured information in JSON format matching this TypeScript interface exactly:

interface ParsedResume {
  basics: {
    name: string;
    title: string;
    summary: string;
    email?: string;
    phone?: string;
    location?: string;
    website?: string;
    github?: string;
    linkedin?: string;
  };
  experience: Array<{
    company: string;
    position: string;
    startDate: string;
    endDate: string;
    highlights: string[];
  }>;
  education: Array<{
    institution: string;
    degree: string;
    field: string;
    graduationDate: string;
  }>;
  skills: string[];
}

Requirements:
1. Extract information exactly as written
2. Use consistent date formats (YYYY-MM)
3. Create a professional summary if none exists
4. Return ONLY valid JSON
5. Include all required fields
6. Use empty arrays for missing sections

Resume text:
{resume_text}"#;

pub fn build_resume_prompt(resume_text: &str) -> String {
    RESUME_PARSE_PROMPT.replace("{resume_text}", resume_text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_ends_with_resume_text() {
        let prompt = build_resume_prompt("Jane Doe\nEngineer");
        assert!(prompt.starts_with("Parse this resume"));
        assert!(prompt.ends_with("Resume text:\nJane Doe\nEngineer"));
        assert!(!prompt.contains("{resume_text}"));
    }
}
