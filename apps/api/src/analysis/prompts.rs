//! Prompt templates for the four analysis calls.
//!
//! Three of the four ask for JSON; the optimized résumé asks for HTML.
//! Placeholders: `{resume_text}`, `{jd_text}`, `{json_instruction}`.

pub const ATS_SCORE_PROMPT_TEMPLATE: &str = r#"You are an ATS (Applicant Tracking System) expert. Analyze the following resume against the job description and provide:
1. An ATS match score (0-100)
2. A brief analysis explaining the score (2-3 sentences)
3. Top 5 keywords from the job description

Resume:
{resume_text}

Job Description:
{jd_text}

{json_instruction}
{
  "score": <number>,
  "analysis": "<string>",
  "keywords": ["keyword1", "keyword2", ...]
}"#;

pub const INTERVIEW_QUESTIONS_PROMPT_TEMPLATE: &str = r#"Based on the following job description, generate 5 relevant interview questions that a candidate should prepare for. Make them specific to the role requirements.

Job Description:
{jd_text}

{json_instruction}
{
  "questions": ["question1", "question2", ...]
}"#;

pub const SUGGESTIONS_PROMPT_TEMPLATE: &str = r#"Based on the resume and job description below, suggest 5 powerful bullet points that the candidate should add or modify in their resume to better match the job requirements. Make them specific, quantifiable, and action-oriented.

Resume:
{resume_text}

Job Description:
{jd_text}

{json_instruction}
{
  "suggestions": ["bullet1", "bullet2", ...]
}"#;

pub const OPTIMIZE_RESUME_PROMPT_TEMPLATE: &str = r#"You are a professional resume writer. Optimize the following resume to better match the job description. Focus on:
1. Rewriting bullet points to include relevant keywords
2. Emphasizing relevant experience
3. Using strong action verbs
4. Maintaining the original structure and format

Resume:
{resume_text}

Job Description:
{jd_text}

Return the optimized resume in HTML format with proper structure (use h1 for name, h2 for sections, ul/li for bullet points, etc.). Make it look professional."#;

/// Used when the user runs an analysis without uploading a résumé.
pub const SAMPLE_RESUME: &str = "John Doe
Software Engineer
john.doe@email.com | (555) 123-4567

EXPERIENCE
Senior Software Engineer | Tech Company | 2020-Present
- Developed web applications using React and Node.js
- Led team of 5 engineers on major projects
- Improved system performance by 40%

Software Engineer | Startup Inc | 2018-2020
- Built RESTful APIs and microservices
- Implemented CI/CD pipelines
- Collaborated with cross-functional teams

EDUCATION
Bachelor of Science in Computer Science | University | 2018

SKILLS
JavaScript, Python, React, Node.js, AWS, Docker";
