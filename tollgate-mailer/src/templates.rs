use askama::Template;

#[derive(Template)]
#[template(
    source = r#"
<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Email Verification - {{ app_name }}</title>
</head>
<body style="font-family: Arial, sans-serif; color: #333;">
    <div style="max-width: 600px; margin: 0 auto;">
        <h2>Email Verification</h2>
        <p>{% if let Some(name) = user_name %}Hello {{ name }},{% else %}Hello,{% endif %}</p>
        <p>Thank you for registering with {{ app_name }}! Please use the following code to verify your email:</p>
        <div style="background-color: #f4f4f4; padding: 20px; text-align: center; font-size: 32px; font-weight: bold; letter-spacing: 5px; margin: 20px 0;">
            {{ code }}
        </div>
        <p>This code will expire in {{ expires_in_minutes }} minutes.</p>
        <p>If you didn't request this code, please ignore this email.</p>
    </div>
</body>
</html>
"#,
    ext = "html"
)]
pub struct VerificationCodeHtml<'a> {
    pub app_name: &'a str,
    pub user_name: Option<&'a str>,
    pub code: &'a str,
    pub expires_in_minutes: i64,
}

#[derive(Template)]
#[template(
    source = r#"{% if let Some(name) = user_name %}Hello {{ name }},{% else %}Hello,{% endif %}

Thank you for registering with {{ app_name }}! Please use the following code to verify your email:

    {{ code }}

This code will expire in {{ expires_in_minutes }} minutes.

If you didn't request this code, please ignore this email.
"#,
    ext = "txt"
)]
pub struct VerificationCodeText<'a> {
    pub app_name: &'a str,
    pub user_name: Option<&'a str>,
    pub code: &'a str,
    pub expires_in_minutes: i64,
}
