use domain::Slug;

/// slug 生成策略，测试中可替换为确定性实现以制造冲突。
pub trait SlugGenerator: Send + Sync {
    fn generate(&self, title: &str) -> Slug;
}

#[derive(Debug, Default)]
pub struct RandomSlugGenerator;

impl SlugGenerator for RandomSlugGenerator {
    fn generate(&self, title: &str) -> Slug {
        Slug::generate(title)
    }
}
