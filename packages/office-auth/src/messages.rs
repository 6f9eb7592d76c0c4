//! User-facing Arabic text. Rendered right-to-left by the front end.

// Informational notices
pub const OFFLINE_NOTICE: &str =
    "أنت غير متصل. تسجيل الدخول متاح فقط للمستخدم الأخير الذي سجل دخوله على هذا الجهاز.";
pub const TRYING_OFFLINE: &str = "فشل الاتصال بالخادم. جاري محاولة تسجيل الدخول دون اتصال...";

// Success / progress messages
pub const VERIFY_MOBILE_TO_CONTINUE: &str = "يرجى تأكيد رقم الجوال للمتابعة.";
pub const ACCOUNT_CREATED: &str =
    "تم إنشاء الحساب بنجاح. يرجى التواصل مع المدير لاستلام كود التفعيل وإدخاله هنا.";
pub const MOBILE_VERIFIED_SIGNING_IN: &str = "تم التحقق من رقم الجوال بنجاح. جاري تسجيل الدخول...";
pub const MOBILE_VERIFIED: &str = "تم التحقق من رقم الجوال بنجاح. يمكنك الآن تسجيل الدخول.";

// Errors
pub const INVALID_MOBILE: &str =
    "رقم الجوال غير صالح. يجب أن يكون رقماً سورياً صحيحاً (مثال: 0912345678).";
pub const INVALID_CREDENTIALS: &str =
    "بيانات الدخول غير صحيحة. يرجى التحقق من رقم الجوال وكلمة المرور.";
pub const ACCOUNT_NOT_ACTIVATED: &str =
    "الحساب غير مفعل. يرجى تأكيد رقم الجوال أو التواصل مع المسؤول.";
pub const DATABASE_NOT_CONFIGURED: &str = "خطأ: قاعدة البيانات غير مهيأة";
pub const VERIFICATION_FUNCTION_MISSING: &str =
    "خطأ في إعداد النظام: يرجى من المدير تشغيل سكربت تأكيد الجوال.";
pub const OPEN_SETUP: &str = "الانتقال إلى صفحة الإعداد";
pub const CONTACT_ADMINISTRATOR: &str = "التواصل مع الإدارة";
pub const NETWORK_UNREACHABLE: &str = "تعذر الاتصال بالخادم. يرجى التحقق من اتصال الإنترنت.";
pub const UNEXPECTED: &str = "حدث خطأ غير متوقع. يرجى المحاولة مرة أخرى.";

pub const OFFLINE_SIGNUP: &str = "لا يمكن إنشاء حساب جديد بدون اتصال بالإنترنت.";
pub const NO_CACHED_ACCOUNT: &str =
    "فشل الاتصال بالخادم، ولا يوجد حساب مخزّن على هذا الجهاز. يرجى الاتصال بالإنترنت.";
pub const OFFLINE_CREDENTIALS_MISMATCH: &str = "بيانات الدخول غير صحيحة للوصول بدون انترنت.";

pub const MOBILE_ALREADY_REGISTERED: &str =
    "هذا الرقم مسجل بالفعل. يرجى تسجيل الدخول أو استخدام رقم جوال آخر.";
pub const ACCOUNT_ALREADY_REGISTERED: &str = "هذا الحساب مسجل بالفعل.";
pub const SIGNUP_FAILED_PREFIX: &str = "فشل إنشاء الحساب: ";
pub const NO_USER_RETURNED: &str = "لم يتم إرجاع بيانات المستخدم.";

pub const INVALID_OTP_CODE: &str = "يرجى إدخال كود التحقق المكون من 6 أرقام.";
pub const WRONG_OTP_CODE: &str = "رمز التحقق غير صحيح.";
pub const NO_CODE_ON_RECORD: &str =
    "لم يتم العثور على كود تفعيل لهذا الرقم. يرجى التواصل مع الإدارة.";
pub const VERIFICATION_FAILED: &str = "فشل التحقق من الكود.";
