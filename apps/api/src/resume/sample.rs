use crate::models::resume::{Basics, Education, Experience, ParsedResume};

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// The built-in sample portfolio, shown when a caller opts into a fallback.
pub fn sample_resume() -> ParsedResume {
    ParsedResume {
        basics: Basics {
            name: "Alex Thompson".into(),
            title: "Senior Full Stack Developer".into(),
            summary: "Passionate full-stack developer with 8+ years of experience building \
                      scalable web applications. Specialized in React, Node.js, and cloud \
                      architecture. Led multiple successful projects from conception to \
                      deployment, focusing on clean code and optimal user experience."
                .into(),
            email: Some("alex.thompson@example.com".into()),
            phone: Some("(555) 123-4567".into()),
            location: Some("San Francisco, CA".into()),
            website: Some("https://alexthompson.dev".into()),
            github: Some("https://github.com/alexthompson".into()),
            linkedin: Some("https://linkedin.com/in/alexthompson".into()),
        },
        experience: vec![
            Experience {
                company: "TechCorp Solutions".into(),
                position: "Senior Full Stack Developer".into(),
                start_date: "2021-01".into(),
                end_date: "Present".into(),
                highlights: strings(&[
                    "Led a team of 5 developers in rebuilding the company's flagship SaaS platform, resulting in a 40% improvement in performance",
                    "Implemented microservices architecture using Node.js and Docker, improving system scalability",
                    "Developed and maintained CI/CD pipelines using GitHub Actions and AWS",
                    "Mentored junior developers and conducted code reviews to ensure code quality",
                ]),
            },
            Experience {
                company: "InnovateTech".into(),
                position: "Full Stack Developer".into(),
                start_date: "2018-03".into(),
                end_date: "2020-12".into(),
                highlights: strings(&[
                    "Built and deployed a real-time analytics dashboard using React and WebSocket",
                    "Reduced API response time by 60% through implementation of Redis caching",
                    "Developed RESTful APIs serving 1M+ requests daily",
                    "Implemented OAuth2 authentication system for third-party integrations",
                ]),
            },
            Experience {
                company: "StartupHub".into(),
                position: "Frontend Developer".into(),
                start_date: "2016-06".into(),
                end_date: "2018-02".into(),
                highlights: strings(&[
                    "Developed responsive web applications using React and TypeScript",
                    "Implemented state management using Redux and Redux-Saga",
                    "Created reusable component library used across multiple projects",
                    "Improved application load time by 45% through code splitting and lazy loading",
                ]),
            },
        ],
        education: vec![
            Education {
                institution: "University of California, Berkeley".into(),
                degree: "Master's".into(),
                field: "Computer Science".into(),
                graduation_date: "2016-05".into(),
            },
            Education {
                institution: "Stanford University".into(),
                degree: "Bachelor's".into(),
                field: "Software Engineering".into(),
                graduation_date: "2014-05".into(),
            },
        ],
        skills: strings(&[
            "JavaScript",
            "TypeScript",
            "React",
            "Node.js",
            "Python",
            "AWS",
            "Docker",
            "Kubernetes",
            "GraphQL",
            "MongoDB",
            "PostgreSQL",
            "Redis",
            "CI/CD",
            "Microservices",
            "System Design",
            "Agile/Scrum",
        ]),
    }
}
