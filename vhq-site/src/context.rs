use std::rc::Rc;

use yew::prelude::*;

use vhq_client::{ApiClient, ClientConfig};

use crate::transport::GlooTransport;

/// Settings of the site. The API is served by the origin of the site.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SiteConfig {
    pub base_url: String,
    pub client: ClientConfig,
}

#[derive(Clone)]
pub struct ApiContext {
    pub client: Rc<ApiClient<GlooTransport>>,
    pub config: Rc<ClientConfig>,
}

impl PartialEq for ApiContext {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.client, &other.client) && self.config == other.config
    }
}

impl ApiContext {
    fn new(config: SiteConfig) -> Self {
        Self {
            client: Rc::new(ApiClient::new(GlooTransport::new(config.base_url))),
            config: Rc::new(config.client),
        }
    }
}

#[derive(Properties, PartialEq)]
pub struct ApiProviderProps {
    #[prop_or_default]
    pub children: Html,
}

#[function_component(ApiProvider)]
pub fn api_provider(props: &ApiProviderProps) -> Html {
    let context = use_state(|| ApiContext::new(SiteConfig::default()));

    html! {
        <ContextProvider<ApiContext> context={(*context).clone()}>
            { props.children.clone() }
        </ContextProvider<ApiContext>>
    }
}

#[hook]
pub fn use_api() -> ApiContext {
    use_context::<ApiContext>().expect("ApiContext not found")
}
