use serde::Serialize;

/// Remediation category for a failure message reported by Fast2SMS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GuidanceCategory {
    AccountVerificationRequired,
    InsufficientBalance,
    ConfigurationIssue,
    InvalidApiKey,
}

/// Substring rules, evaluated top to bottom. The first match decides the category.
pub const GUIDANCE_RULES: &[(&str, GuidanceCategory)] = &[
    ("transaction", GuidanceCategory::AccountVerificationRequired),
    ("100 INR", GuidanceCategory::AccountVerificationRequired),
    (
        "complete one transaction",
        GuidanceCategory::AccountVerificationRequired,
    ),
    ("balance", GuidanceCategory::InsufficientBalance),
    ("credit", GuidanceCategory::InsufficientBalance),
    ("insufficient", GuidanceCategory::InsufficientBalance),
    ("invalid", GuidanceCategory::ConfigurationIssue),
    ("Invalid", GuidanceCategory::ConfigurationIssue),
    ("Sender ID", GuidanceCategory::ConfigurationIssue),
    ("unauthorized", GuidanceCategory::InvalidApiKey),
    ("Unauthorized", GuidanceCategory::InvalidApiKey),
];

impl GuidanceCategory {
    /// Pick the category for a provider message, if any rule matches.
    pub fn classify(provider_message: &str) -> Option<Self> {
        GUIDANCE_RULES
            .iter()
            .find(|(pattern, _)| provider_message.contains(pattern))
            .map(|(_, category)| *category)
    }

    /// User-facing remediation text. Only [`GuidanceCategory::ConfigurationIssue`]
    /// echoes the provider message.
    pub fn guidance(self, provider_message: &str) -> String {
        match self {
            Self::AccountVerificationRequired => "Fast2SMS Account Verification Required:\n\n\
                 Your Fast2SMS account needs to be verified before sending SMS.\n\n\
                 To fix this:\n\
                 1. Login to https://www.fast2sms.com/\n\
                 2. Complete a transaction of Rs. 100 or more (recharge your account)\n\
                 3. Wait for account verification\n\
                 4. Try sending SMS again\n\n\
                 Alternatively, contact Fast2SMS support for account activation."
                .to_owned(),
            Self::InsufficientBalance => "Insufficient Fast2SMS Balance:\n\n\
                 Your Fast2SMS account has insufficient balance.\n\n\
                 To fix this:\n\
                 1. Login to https://www.fast2sms.com/\n\
                 2. Recharge your account with sufficient balance\n\
                 3. Try sending SMS again"
                .to_owned(),
            Self::ConfigurationIssue => format!(
                "Fast2SMS Configuration Issue:\n\n{provider_message}\n\n\
                 To fix this:\n\
                 1. Check FAST2SMS_API_KEY in the environment or .env file\n\
                 2. Verify phone number format (10-12 digits)\n\
                 3. If using the DLT route, register a Sender ID in the Fast2SMS dashboard\n\
                 4. Try using the Quick route (q) instead of the DLT route"
            ),
            Self::InvalidApiKey => "Invalid Fast2SMS API Key:\n\n\
                 Your API key is invalid or expired.\n\n\
                 To fix this:\n\
                 1. Login to https://www.fast2sms.com/\n\
                 2. Go to Dashboard -> API\n\
                 3. Generate a new API key\n\
                 4. Update FAST2SMS_API_KEY in the .env file\n\
                 5. Restart the relay"
                .to_owned(),
        }
    }
}

/// Classified provider failure: the text to show and the provider's own words.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Guidance {
    pub category: Option<GuidanceCategory>,
    pub text: String,
    pub original: String,
}

impl Guidance {
    /// Unmatched messages pass through unchanged.
    pub fn for_provider_message(provider_message: &str) -> Self {
        let category = GuidanceCategory::classify(provider_message);
        let text = match category {
            Some(category) => category.guidance(provider_message),
            None => provider_message.to_owned(),
        };
        Self {
            category,
            text,
            original: provider_message.to_owned(),
        }
    }
}
