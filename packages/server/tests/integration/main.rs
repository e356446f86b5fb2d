
mod files;
mod home;
