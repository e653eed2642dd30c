//! 内置短语词典
//!
//! 常见界面标签的静态翻译表。在任何网络请求之前查询，命中即返回。
//! 查找按原文精确匹配，不做大小写或空白规范化。

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::translation::error::{TranslationError, TranslationResult};
use crate::translation::language::Language;

/// 内置短语：英文原文与 es / it / tr / ar 译文
const BUILTIN_PHRASES: &[(&str, [&str; 4])] = &[
    ("Dashboard", ["Panel", "Pannello", "Gösterge Paneli", "لوحة التحكم"]),
    ("Conversations", ["Conversaciones", "Conversazioni", "Konuşmalar", "المحادثات"]),
    ("Inbox", ["Bandeja de entrada", "Posta in arrivo", "Gelen Kutusu", "صندوق الوارد"]),
    ("Contacts", ["Contactos", "Contatti", "Kişiler", "جهات الاتصال"]),
    ("Campaigns", ["Campañas", "Campagne", "Kampanyalar", "الحملات"]),
    ("Automations", ["Automatizaciones", "Automazioni", "Otomasyonlar", "الأتمتة"]),
    ("Knowledge Base", ["Base de conocimiento", "Base di conoscenza", "Bilgi Bankası", "قاعدة المعرفة"]),
    ("Settings", ["Configuración", "Impostazioni", "Ayarlar", "الإعدادات"]),
    ("Language", ["Idioma", "Lingua", "Dil", "اللغة"]),
    ("Save", ["Guardar", "Salva", "Kaydet", "حفظ"]),
    ("Save Changes", ["Guardar cambios", "Salva modifiche", "Değişiklikleri Kaydet", "حفظ التغييرات"]),
    ("Cancel", ["Cancelar", "Annulla", "İptal", "إلغاء"]),
    ("Delete", ["Eliminar", "Elimina", "Sil", "حذف"]),
    ("Edit", ["Editar", "Modifica", "Düzenle", "تعديل"]),
    ("Search", ["Buscar", "Cerca", "Ara", "بحث"]),
    ("Search...", ["Buscar...", "Cerca...", "Ara...", "بحث..."]),
    ("Filter", ["Filtrar", "Filtra", "Filtrele", "تصفية"]),
    ("Create", ["Crear", "Crea", "Oluştur", "إنشاء"]),
    ("Close", ["Cerrar", "Chiudi", "Kapat", "إغلاق"]),
    ("Back", ["Atrás", "Indietro", "Geri", "رجوع"]),
    ("Next", ["Siguiente", "Avanti", "İleri", "التالي"]),
    ("Loading...", ["Cargando...", "Caricamento...", "Yükleniyor...", "جارٍ التحميل..."]),
    ("Sign In", ["Iniciar sesión", "Accedi", "Giriş Yap", "تسجيل الدخول"]),
    ("Sign Out", ["Cerrar sesión", "Esci", "Çıkış Yap", "تسجيل الخروج"]),
    ("Profile", ["Perfil", "Profilo", "Profil", "الملف الشخصي"]),
    ("Notifications", ["Notificaciones", "Notifiche", "Bildirimler", "الإشعارات"]),
    ("Status", ["Estado", "Stato", "Durum", "الحالة"]),
    ("Active", ["Activo", "Attivo", "Aktif", "نشط"]),
    ("Inactive", ["Inactivo", "Inattivo", "Pasif", "غير نشط"]),
    ("Name", ["Nombre", "Nome", "Ad", "الاسم"]),
    ("Email", ["Correo electrónico", "Email", "E-posta", "البريد الإلكتروني"]),
    ("Phone", ["Teléfono", "Telefono", "Telefon", "الهاتف"]),
    ("Send", ["Enviar", "Invia", "Gönder", "إرسال"]),
    ("Messages", ["Mensajes", "Messaggi", "Mesajlar", "الرسائل"]),
    ("Upload", ["Subir", "Carica", "Yükle", "رفع"]),
    ("Privacy", ["Privacidad", "Privacy", "Gizlilik", "الخصوصية"]),
];

fn builtin_tables() -> &'static HashMap<Language, HashMap<String, String>> {
    static TABLES: OnceLock<HashMap<Language, HashMap<String, String>>> = OnceLock::new();
    TABLES.get_or_init(|| {
        let targets = [Language::Es, Language::It, Language::Tr, Language::Ar];
        let mut tables: HashMap<Language, HashMap<String, String>> = HashMap::new();

        for (source, translations) in BUILTIN_PHRASES {
            for (lang, translated) in targets.iter().zip(translations.iter()) {
                tables
                    .entry(*lang)
                    .or_default()
                    .insert(source.to_string(), translated.to_string());
            }
        }

        tables
    })
}

/// 短语词典
#[derive(Debug, Clone, Default)]
pub struct Dictionary {
    tables: HashMap<Language, HashMap<String, String>>,
}

impl Dictionary {
    /// 空词典
    pub fn empty() -> Self {
        Self::default()
    }

    /// 内置界面标签词典
    pub fn builtin() -> Self {
        Self {
            tables: builtin_tables().clone(),
        }
    }

    /// 从TOML加载自定义短语
    ///
    /// 每个表是一个语言代码，键为英文原文：
    ///
    /// ```toml
    /// [es]
    /// "Save" = "Guardar"
    /// ```
    pub fn from_toml_str(content: &str) -> TranslationResult<Self> {
        let raw: HashMap<String, HashMap<String, String>> = toml::from_str(content)?;
        let mut tables = HashMap::new();

        for (code, phrases) in raw {
            let lang: Language = code.parse()?;
            if lang.is_noop() {
                return Err(TranslationError::InvalidInput(
                    "词典不能包含英语表".to_string(),
                ));
            }
            tables.insert(lang, phrases);
        }

        Ok(Self { tables })
    }

    /// 合并另一个词典，冲突时以 `other` 为准
    pub fn merge(mut self, other: Dictionary) -> Self {
        for (lang, phrases) in other.tables {
            self.tables.entry(lang).or_default().extend(phrases);
        }
        self
    }

    /// 插入单条短语
    pub fn insert(&mut self, source: &str, language: Language, translated: &str) {
        if language.is_noop() {
            return;
        }
        self.tables
            .entry(language)
            .or_default()
            .insert(source.to_string(), translated.to_string());
    }

    /// 查找译文，未命中返回 `None`
    pub fn get(&self, text: &str, language: Language) -> Option<&str> {
        if language.is_noop() {
            return None;
        }
        self.tables
            .get(&language)
            .and_then(|table| table.get(text))
            .map(String::as_str)
    }

    /// 查找译文，未命中时原样返回
    pub fn lookup(&self, text: &str, language: Language) -> String {
        self.get(text, language).unwrap_or(text).to_string()
    }

    /// 指定语言的短语数量
    pub fn len(&self, language: Language) -> usize {
        self.tables.get(&language).map_or(0, HashMap::len)
    }

    pub fn is_empty(&self) -> bool {
        self.tables.values().all(HashMap::is_empty)
    }
}
