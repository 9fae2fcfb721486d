//! Static reference material served alongside the generated content.

use serde::{Deserialize, Serialize};

use crate::training::{incident, modules, phishing, scenario};

/// One entry of the module catalogue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleSummary {
    pub id: String,
    pub title: String,
    pub description: String,
    /// Whether the module's interactive parts need the generation service.
    pub requires_generation: bool,
    /// Pick-list values the module accepts, if any.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<String>,
}

/// A titled block of static material.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentSection {
    pub topic: String,
    pub title: String,
    pub intro: String,
    pub entries: Vec<ContentEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentEntry {
    pub title: String,
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Grouping label, e.g. the category of a reference link.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

fn entry(title: &str, body: &str) -> ContentEntry {
    ContentEntry {
        title: title.to_string(),
        body: body.to_string(),
        url: None,
        group: None,
    }
}

fn link(group: &str, title: &str, url: &str, body: &str) -> ContentEntry {
    ContentEntry {
        title: title.to_string(),
        body: body.to_string(),
        url: Some(url.to_string()),
        group: Some(group.to_string()),
    }
}

fn module(
    id: &str,
    title: &str,
    description: &str,
    requires_generation: bool,
    choices: &[&str],
) -> ModuleSummary {
    ModuleSummary {
        id: id.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        requires_generation,
        choices: choices.iter().map(|c| c.to_string()).collect(),
    }
}

pub fn catalogue() -> Vec<ModuleSummary> {
    vec![
        module(
            modules::PHISHING,
            "Phishing Training",
            "Spot the red flags in simulated phishing emails and get a second opinion on emails you received.",
            true,
            phishing::EMAIL_TYPES,
        ),
        module(
            "password",
            "Password Generator & Tips",
            "Generate strong passwords and check how hard yours are to guess.",
            false,
            &[],
        ),
        module(
            modules::SCENARIO,
            "Incident Scenario Simulation",
            "Respond to a simulated incident and get feedback on your strategy.",
            true,
            scenario::CATEGORIES,
        ),
        module(
            modules::COMPLIANCE,
            "Compliance Hub",
            "Compliance tooling, awareness programme essentials and a compliance Q&A assistant.",
            true,
            &[],
        ),
        module(
            modules::INCIDENT_RESPONSE,
            "Incident Response Guides",
            "The core response phases, reporting duties and guides tailored to an incident type.",
            true,
            incident::GUIDE_CATEGORIES,
        ),
        module(
            modules::QUIZ,
            "Cybersecurity Knowledge Quiz",
            "A fresh set of multiple-choice questions each time, graded instantly.",
            true,
            &[],
        ),
        module(
            "advisories",
            "Latest CVE Insights",
            "The most recently published vulnerabilities from the National Vulnerability Database.",
            false,
            &[],
        ),
        module(
            modules::REFERENCE,
            "Regulatory & Best Practice References",
            "Key directives, Irish legislation and standards, plus a regulations Q&A assistant.",
            true,
            &[],
        ),
        module(
            "awareness",
            "Why Security Awareness Matters",
            "Why every member of staff is part of the railway's defence.",
            false,
            &[],
        ),
    ]
}

pub const TOPICS: &[&str] = &[
    "references",
    "compliance_tools",
    "awareness_program",
    "incident_response",
    "password_tips",
    "awareness_importance",
    "cvss_scale",
];

/// Static material for `topic`, or `None` for an unknown topic.
pub fn section(topic: &str) -> Option<ContentSection> {
    let (title, intro, entries) = match topic {
        "references" => (
            "Essential Cybersecurity & Regulatory References",
            "Official sources on the directives, laws and standards that apply to the railway.",
            references(),
        ),
        "compliance_tools" => (
            "Key Compliance Tools & Technologies for Rail Operators",
            "Tool categories that underpin NIS2 and GDPR compliance.",
            compliance_tools(),
        ),
        "awareness_program" => (
            "Security Awareness Programme Essentials",
            "What a programme for an organisation like Iarnród Éireann should cover.",
            awareness_program(),
        ),
        "incident_response" => (
            "Core Phases of Incident Response",
            "A general framework aligned with industry practice and NIS2/GDPR expectations.",
            incident_response(),
        ),
        "password_tips" => (
            "Password Tips",
            "Habits that keep accounts safe.",
            password_tips(),
        ),
        "awareness_importance" => (
            "Why Security Awareness Matters",
            "Technology alone does not stop attacks that target people.",
            awareness_importance(),
        ),
        "cvss_scale" => (
            "CVSS Severity Scale",
            "How CVSS v3 base scores map to qualitative ratings.",
            cvss_scale(),
        ),
        _ => return None,
    };

    Some(ContentSection {
        topic: topic.to_string(),
        title: title.to_string(),
        intro: intro.to_string(),
        entries,
    })
}

fn references() -> Vec<ContentEntry> {
    const EU: &str = "EU Directives & Regulations";
    const IE: &str = "Irish Legislation & Guidance";
    const STD: &str = "Industry Standards & Best Practices";
    vec![
        link(
            EU,
            "NIS2 Directive Overview",
            "https://digital-strategy.ec.europa.eu/en/policies/nis2-directive",
            "The primary EU legislation on cybersecurity for essential and important entities.",
        ),
        link(
            EU,
            "Critical Entities Resilience (CER) Directive",
            "https://www.consilium.europa.eu/en/press/press-releases/2022/12/08/council-adopts-new-rules-to-enhance-the-resilience-of-critical-entities/",
            "Complements NIS2 with a focus on the physical resilience of critical entities.",
        ),
        link(
            EU,
            "What is GDPR?",
            "https://gdpr.eu/what-is-gdpr/",
            "Overview of the General Data Protection Regulation.",
        ),
        link(
            EU,
            "ENISA Transport Sector Reports",
            "https://www.enisa.europa.eu/topics/critical-information-infrastructures-and-services/nis-directive/sectoral-information/transport",
            "Guidance and threat reports for the transport sector.",
        ),
        link(
            IE,
            "NCSC Ireland NIS2 Guide",
            "https://www.ncsc.gov.ie/pdfs/NCSC_NIS2_Guide.pdf",
            "Guidance on NIS2 from Ireland's National Cyber Security Centre.",
        ),
        link(
            IE,
            "Data Protection Act 2018",
            "https://www.irishstatutebook.ie/eli/2018/act/7/enacted/en/html",
            "The Irish law that gives further effect to GDPR.",
        ),
        link(
            IE,
            "Data Protection Commission: GDPR Overview",
            "https://www.dataprotection.ie/en/organisations/know-your-obligations/what-gdpr",
            "Guidance from Ireland's data protection authority.",
        ),
        link(
            STD,
            "ISO/IEC 27001",
            "https://www.iso.org/isoiec-27001-information-security.html",
            "International standard for information security management systems.",
        ),
        link(
            STD,
            "IEC 62443",
            "https://www.isa.org/standards-and-publications/isa-standards/isa-iec-62443-series-of-standards",
            "Security for industrial automation and control systems, central to rail OT.",
        ),
        link(
            STD,
            "NIST Cybersecurity Framework",
            "https://www.nist.gov/cyberframework",
            "A widely used framework for improving critical infrastructure cybersecurity.",
        ),
    ]
}

fn compliance_tools() -> Vec<ContentEntry> {
    vec![
        entry(
            "SIEM",
            "Splunk, IBM QRadar or Microsoft Sentinel aggregate IT and OT logs for continuous monitoring, detection and incident analysis.",
        ),
        entry(
            "SOAR",
            "Cortex XSOAR or IBM Resilient automate response workflows, helping meet the 24-hour NIS2 early warning.",
        ),
        entry(
            "GRC Platforms",
            "RSA Archer, ServiceNow GRC or MetricStream map NIS2, GDPR and CER obligations to internal controls and track status.",
        ),
        entry(
            "Vulnerability Management",
            "Tenable Nessus, Qualys or Rapid7 InsightVM scan IT and OT networks so patching keeps pace with risk.",
        ),
        entry(
            "IDS/IPS and EDR/XDR",
            "Endpoint and network detection, plus OT-aware monitoring such as Nozomi Networks or Claroty, stop lateral movement.",
        ),
        entry(
            "IAM and PAM",
            "Okta, Entra ID or CyberArk enforce MFA, least privilege and control of privileged accounts.",
        ),
        entry(
            "DLP and Encryption",
            "Protect customer and operational data at rest and in transit, including on legacy systems where feasible.",
        ),
        entry(
            "OT Security Monitoring",
            "Monitoring built for industrial protocols protects signalling and control systems.",
        ),
    ]
}

fn awareness_program() -> Vec<ContentEntry> {
    vec![
        entry(
            "Core Objectives",
            "Reduce human error, protect critical IT and OT assets, build a vigilant culture and meet regulatory training duties.",
        ),
        entry(
            "Foundational Training",
            "Phishing and social engineering, password management, safe use of removable media, incident reporting and GDPR basics for all staff.",
        ),
        entry(
            "Role-Specific Modules",
            "Advanced detection and OT procedures for technical staff, cyber risk and crisis communication for managers, data handling for HR, finance and customer service.",
        ),
        entry(
            "Delivery",
            "Interactive e-learning, targeted workshops, regular phishing simulations, internal communications and a security champions network.",
        ),
        entry(
            "Measuring Success",
            "Completion rates, quiz and simulation results, the quality of user-reported incidents, feedback surveys and periodic audits.",
        ),
    ]
}

fn incident_response() -> Vec<ContentEntry> {
    vec![
        entry(
            "1. Preparation",
            "Maintain a response plan and team with clear roles, the right tooling, regular drills and a current risk assessment of IT and OT systems.",
        ),
        entry(
            "2. Identification",
            "Detect and confirm incidents through SIEM, IDS/IPS, EDR and OT monitoring alerts and user reports, then scope and rate severity.",
        ),
        entry(
            "3. Containment",
            "Isolate affected segments, block malicious addresses and disable compromised accounts, then put longer-term containment in place.",
        ),
        entry(
            "4. Eradication",
            "Remove malware and attacker footholds and fix the exploited weakness, coordinating OT work with operational safety.",
        ),
        entry(
            "5. Recovery",
            "Restore from clean backups, validate integrity, watch for reinfection and return services in phases with safety first.",
        ),
        entry(
            "6. Post-Incident Analysis",
            "Find the root cause, review the response, update the plan and controls, and share lessons learned.",
        ),
        entry(
            "Reporting under NIS2",
            "Significant incidents need an early warning to the NCSC within 24 hours, a notification within 72 hours and a final report within one month.",
        ),
        entry(
            "Reporting under GDPR",
            "Personal data breaches go to the Data Protection Commission within 72 hours unless they are unlikely to put individuals at risk.",
        ),
        entry(
            "Preserve Evidence",
            "Keep detailed logs and forensic evidence for analysis, regulators and possible legal action.",
        ),
    ]
}

fn password_tips() -> Vec<ContentEntry> {
    vec![
        entry(
            "Length beats complexity",
            "Use at least 12 characters; a passphrase of several unrelated words is strong and memorable.",
        ),
        entry(
            "One account, one password",
            "Never reuse passwords, so one breach cannot unlock other systems.",
        ),
        entry(
            "Use a password manager",
            "Let an approved manager generate and store unique passwords.",
        ),
        entry(
            "Turn on MFA",
            "Multi-factor authentication stops most attacks that rely on stolen passwords.",
        ),
        entry(
            "Avoid personal details",
            "Names, birthdays, depots and team names are the first things an attacker tries.",
        ),
        entry("Never share", "IT staff will never ask for your password; report anyone who does."),
    ]
}

fn awareness_importance() -> Vec<ContentEntry> {
    vec![
        entry(
            "People are targeted first",
            "Most breaches start with phishing or social engineering rather than a technical exploit.",
        ),
        entry(
            "Safety depends on it",
            "Compromise of signalling or operational systems can affect passenger safety and service.",
        ),
        entry(
            "It is a legal duty",
            "NIS2 requires essential entities to train staff and holds management accountable.",
        ),
        entry(
            "Early reports limit damage",
            "Fast reporting of suspicious activity lets the security team contain incidents before they spread.",
        ),
    ]
}

fn cvss_scale() -> Vec<ContentEntry> {
    vec![
        entry("None", "0.0"),
        entry("Low", "0.1 - 3.9"),
        entry("Medium", "4.0 - 6.9"),
        entry("High", "7.0 - 8.9"),
        entry("Critical", "9.0 - 10.0"),
    ]
}
